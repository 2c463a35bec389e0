// Handlebars pages of the events website
// Every page is rendered on its own and then wrapped in the `default` layout.

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::{WebsiteError, WebsiteResult};

pub const LAYOUT: &str = "default";
pub const HOME: &str = "home";
pub const EVENT: &str = "event";
pub const ABOUT: &str = "about";
pub const ERROR_MESSAGE: &str = "error_message";

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{title}}</title>
</head>
<body>
  <nav>
    <a href="/">Events</a> | <a href="/about">About</a>
  </nav>
  <main>
{{{body}}}
  </main>
</body>
</html>
"#;

const HOME_TEMPLATE: &str = r#"<h1>Upcoming Events</h1>
<ul class="events">
{{#each events}}
  <li class="event">
    <a href="/event/{{id}}">{{title}}</a>
    <span class="when">{{event_time}}</span>
    <span class="where">{{location}}</span>
    <span class="likes">{{likes}} likes</span>
    <form method="post" action="/like/event">
      <input type="hidden" name="id" value="{{id}}">
      <button type="submit">Like</button>
    </form>
    <form method="post" action="/event/unlike">
      <input type="hidden" name="id" value="{{id}}">
      <button type="submit">Unlike</button>
    </form>
    <a href="/event/delete/{{id}}">Delete</a>
  </li>
{{else}}
  <li>No events yet.</li>
{{/each}}
</ul>

<h2>Add an event</h2>
<form method="post" action="/event">
  <input name="title" placeholder="Title">
  <input name="event_time" placeholder="When">
  <input name="location" placeholder="Where">
  <textarea name="description" placeholder="Description"></textarea>
  <button type="submit">Add event</button>
</form>
"#;

const EVENT_TEMPLATE: &str = r#"<h1>{{title}}</h1>
<p class="when">{{event_time}}</p>
<p class="where">{{location}}</p>
<p class="description">{{description}}</p>
<p class="likes">{{likes}} likes</p>

<h2>Comments</h2>
<ul class="comments">
{{#each comments}}
  <li class="comment">
    {{comment}}
    <a href="/comment/delete/{{event_id}}/{{id}}">Delete</a>
  </li>
{{else}}
  <li>No comments yet.</li>
{{/each}}
</ul>

<form method="post" action="/comment">
  <input type="hidden" name="event_id" value="{{id}}">
  <textarea name="comment" placeholder="Add a comment"></textarea>
  <button type="submit">Comment</button>
</form>

<h2>Edit event</h2>
<form method="post" action="/event/update">
  <input type="hidden" name="id" value="{{id}}">
  <input name="title" value="{{title}}">
  <input name="event_time" value="{{event_time}}">
  <input name="location" value="{{location}}">
  <textarea name="description">{{description}}</textarea>
  <button type="submit">Save</button>
</form>
"#;

const ABOUT_TEMPLATE: &str = r#"<h1>About</h1>
<p>Post upcoming events, like them and leave comments.</p>
<p>Version {{version}}</p>
"#;

const ERROR_MESSAGE_TEMPLATE: &str = r#"<h1>Something went wrong</h1>
<p class="error">{{error}}</p>
<a href="/">Back to events</a>
"#;

/// Registered page templates.
#[derive(Clone)]
pub struct SiteTemplates {
    handlebars: Arc<Handlebars<'static>>,
}

impl SiteTemplates {
    pub fn new() -> WebsiteResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);

        for (name, source) in [
            (LAYOUT, DEFAULT_TEMPLATE),
            (HOME, HOME_TEMPLATE),
            (EVENT, EVENT_TEMPLATE),
            (ABOUT, ABOUT_TEMPLATE),
            (ERROR_MESSAGE, ERROR_MESSAGE_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| WebsiteError::Template(format!("Failed to register {}: {}", name, e)))?;
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    /// Render `page` with `data` inside the layout.
    pub fn render_page<T: Serialize>(&self, page: &str, title: &str, data: &T) -> WebsiteResult<String> {
        debug!(page, "rendering page");
        let body = self
            .handlebars
            .render(page, data)
            .map_err(|e| WebsiteError::Template(e.to_string()))?;
        self.handlebars
            .render(LAYOUT, &json!({ "title": title, "body": body }))
            .map_err(|e| WebsiteError::Template(e.to_string()))
    }

    pub fn render_error(&self, error: &str) -> WebsiteResult<String> {
        self.render_page(ERROR_MESSAGE, "Error", &json!({ "error": error }))
    }
}

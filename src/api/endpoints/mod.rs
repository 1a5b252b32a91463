//! Request handlers. `form` serves the HTML pages, `assess` the JSON API.

pub mod assess;
pub mod form;
pub mod health;

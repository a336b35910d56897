//! sable turns a project of content files, templates, and static assets
//! into a rendered site, injecting date-sorted collection data into every
//! page's render context.

pub mod build;
pub mod commands;
pub mod config;
pub mod report;
pub mod util;

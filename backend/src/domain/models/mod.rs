//! Domain models. These are the shapes the services reason about; the
//! `shared` crate holds their wire representations and the REST mappers
//! translate between the two.

pub mod document;
pub mod time_entry;
pub mod user;
pub mod vacation_request;

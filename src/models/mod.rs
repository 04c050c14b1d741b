pub mod contact;
pub mod message;
pub mod participant;
pub mod room;
pub mod user;

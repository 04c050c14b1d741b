pub mod contact;
pub mod message;
pub mod participant;
pub mod room;
pub mod stats;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

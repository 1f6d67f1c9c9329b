pub(crate) mod collab;
pub(crate) mod config;
pub(crate) mod controller;

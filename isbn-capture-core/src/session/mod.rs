pub mod scan_session;

mod dispatcher;
mod shared;
mod teardown;
mod worker;

mod exec_log;
pub use exec_log::ExecLog;

mod logging_driver;
pub use logging_driver::{DriverOp, LoggingDriver};

mod setup;
pub use setup::{
    api_key, app_user, policy, schema, schema_with, Fixture, MEMBERS, PROJECT, TODOS,
};

pub use std_util::*;

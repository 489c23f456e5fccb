pub mod cache;
pub mod error;
pub mod executable_utils;
pub mod http;
pub mod model;
pub mod service;
pub mod storage;

//! BOSH Ansible Inventory
//!
//! Builds an Ansible inventory from the deployments, jobs and instances
//! managed by a BOSH director.

pub mod app;
pub mod errors;
pub mod http;
pub mod inventory;
pub mod logs;
pub mod models;
pub mod storage;
pub mod utils;

//! kubedemo library
//!
//! Walkthroughs of the Kubernetes API client: listing pods, managing a
//! Deployment and a Service, and watching change streams.

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod k8s;

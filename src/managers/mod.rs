pub mod account;
pub mod alerts;
pub mod apm;
pub mod entity;
pub mod nerdgraph;
pub mod nrql;
pub mod rest;
pub mod synthetics;

pub mod cluster_query;
pub mod common;
pub mod deployment;
pub mod dispatcher;
pub mod interface;
pub mod job;
pub mod node_set;
pub mod persistent_storage;
pub mod pod;
pub mod report;
pub mod toleration;
pub mod toleration_parser;

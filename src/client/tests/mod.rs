use super::test_helpers::*;
use super::*;
use crate::diagnostics::MemorySink;
use crate::params::Parameters;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod fragments;

//! Action-group request/response boundary
//!
//! Requests are plain JSON objects; the operation is selected by the exact
//! set of fields present. Results serialize as the matching model entity and
//! failures as `{"status": "error", "message": ...}`. The agent-runtime
//! function-call envelope is supported on top of the same dispatch.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

use crate::analyzer::CostAnalyzer;
use crate::configuration::decimal_from_value;
use crate::error::{CostError, CostResult};
use crate::models::{
    Architecture, Comparison, Configuration, CostEstimate, DiscountResult, OptimizationReport,
    ServiceCost,
};
use crate::observability::{AnalyzerMetrics, StructuredLogger};
use crate::optimizer;

/// Agent-runtime message version echoed in every reply
pub const MESSAGE_VERSION: &str = "1.0";

/// The five analyzer operations reachable through the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    EstimateServiceCost,
    CalculateTotalCost,
    ApplyAnzDiscounts,
    IdentifyCostOptimizations,
    CompareCosts,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::EstimateServiceCost,
        Operation::CalculateTotalCost,
        Operation::ApplyAnzDiscounts,
        Operation::IdentifyCostOptimizations,
        Operation::CompareCosts,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::EstimateServiceCost => "estimate_service_cost",
            Operation::CalculateTotalCost => "calculate_total_cost",
            Operation::ApplyAnzDiscounts => "apply_anz_discounts",
            Operation::IdentifyCostOptimizations => "identify_cost_optimizations",
            Operation::CompareCosts => "compare_costs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed request for exactly one operation
#[derive(Debug, Clone, PartialEq)]
pub enum ActionRequest {
    EstimateServiceCost {
        service: String,
        configuration: Configuration,
        region: Option<String>,
    },
    CalculateTotalCost {
        architecture: Architecture,
        region: Option<String>,
    },
    ApplyAnzDiscounts {
        base_cost: Decimal,
    },
    IdentifyCostOptimizations {
        breakdown: Vec<ServiceCost>,
    },
    CompareCosts {
        onprem_cost: Decimal,
        aws_cost: Decimal,
    },
}

fn invalid(message: impl Into<String>) -> CostError {
    CostError::invalid_input(message)
}

/// Decode a structured field that arrived as a JSON-encoded string
fn structured(value: Value) -> Value {
    match value {
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
            _ => Value::String(s),
        },
        other => other,
    }
}

fn take(map: &mut Map<String, Value>, key: &str) -> Value {
    map.remove(key).unwrap_or(Value::Null)
}

fn money_field(map: &mut Map<String, Value>, key: &str) -> CostResult<Decimal> {
    let value = take(map, key);
    decimal_from_value(&value).ok_or_else(|| invalid(format!("{} must be a number, got {}", key, value)))
}

impl ActionRequest {
    /// Select and parse an operation from a request document
    pub fn from_value(value: Value) -> CostResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(invalid("request must be a JSON object"));
        };

        let region = match map.remove("region") {
            None | Some(Value::Null) => None,
            Some(Value::String(region)) => Some(region),
            Some(other) => return Err(invalid(format!("region must be a string, got {}", other))),
        };

        let fields: BTreeSet<String> = map.keys().cloned().collect();
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();

        let request = match (fields.as_slice(), region) {
            (["service"] | ["configuration", "service"], region) => {
                let service = match take(&mut map, "service") {
                    Value::String(s) if !s.trim().is_empty() => s,
                    other => return Err(invalid(format!("service must be a non-empty string, got {}", other))),
                };
                let configuration = match structured(take(&mut map, "configuration")) {
                    Value::Null => Configuration::new(),
                    Value::Object(cfg) => cfg,
                    other => {
                        return Err(invalid(format!("configuration must be an object, got {}", other)))
                    }
                };
                ActionRequest::EstimateServiceCost {
                    service,
                    configuration,
                    region,
                }
            }
            (["architecture"], region) => {
                let architecture: Architecture =
                    serde_json::from_value(structured(take(&mut map, "architecture")))
                        .map_err(|e| invalid(format!("invalid architecture: {}", e)))?;
                ActionRequest::CalculateTotalCost {
                    architecture,
                    region,
                }
            }
            (["base_cost"], None) => ActionRequest::ApplyAnzDiscounts {
                base_cost: money_field(&mut map, "base_cost")?,
            },
            (["breakdown"], None) => {
                let breakdown: Vec<ServiceCost> =
                    serde_json::from_value(structured(take(&mut map, "breakdown")))
                        .map_err(|e| invalid(format!("invalid breakdown: {}", e)))?;
                if breakdown.is_empty() {
                    return Err(invalid("breakdown must contain at least one service cost"));
                }
                if let Some(line) = breakdown.iter().find(|l| l.monthly_cost < Decimal::ZERO) {
                    return Err(invalid(format!(
                        "{}: monthly_cost must be non-negative",
                        line.service_name
                    )));
                }
                ActionRequest::IdentifyCostOptimizations { breakdown }
            }
            (["aws_cost", "onprem_cost"], None) => ActionRequest::CompareCosts {
                onprem_cost: money_field(&mut map, "onprem_cost")?,
                aws_cost: money_field(&mut map, "aws_cost")?,
            },
            _ => {
                return Err(invalid(format!(
                    "request fields [{}] do not match exactly one operation",
                    fields.join(", ")
                )));
            }
        };

        Ok(request)
    }

    pub fn operation(&self) -> Operation {
        match self {
            ActionRequest::EstimateServiceCost { .. } => Operation::EstimateServiceCost,
            ActionRequest::CalculateTotalCost { .. } => Operation::CalculateTotalCost,
            ActionRequest::ApplyAnzDiscounts { .. } => Operation::ApplyAnzDiscounts,
            ActionRequest::IdentifyCostOptimizations { .. } => Operation::IdentifyCostOptimizations,
            ActionRequest::CompareCosts { .. } => Operation::CompareCosts,
        }
    }
}

/// Result entity of one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionResponse {
    ServiceCost(ServiceCost),
    CostEstimate(CostEstimate),
    Discount(DiscountResult),
    Optimizations(OptimizationReport),
    Comparison(Comparison),
}

/// Structured failure returned across the boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub status: String,
    pub message: String,
}

impl From<&CostError> for ErrorDocument {
    fn from(err: &CostError) -> Self {
        Self {
            status: "error".to_string(),
            message: err.to_string(),
        }
    }
}

/// Serialize an operation outcome as the boundary document
pub fn to_document(result: &CostResult<ActionResponse>) -> Value {
    let document = match result {
        Ok(response) => serde_json::to_value(response),
        Err(err) => serde_json::to_value(ErrorDocument::from(err)),
    };
    document.unwrap_or_else(|e| {
        serde_json::json!({ "status": "error", "message": format!("failed to serialize response: {}", e) })
    })
}

/// One `{name, type, value}` parameter of an agent-runtime function call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentParameter {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: Value,
}

/// Function-call event delivered by the agent runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEvent {
    #[serde(default)]
    pub message_version: Option<String>,
    #[serde(default)]
    pub action_group: String,
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub parameters: Vec<AgentParameter>,
}

impl AgentEvent {
    /// Collapse the parameter list into a request document
    ///
    /// The runtime delivers every value as a string; values that hold JSON
    /// numbers, objects or arrays are decoded.
    pub fn request_document(&self) -> Value {
        let map = self
            .parameters
            .iter()
            .map(|param| {
                let value = match &param.value {
                    Value::String(s) => match serde_json::from_str::<Value>(s) {
                        Ok(parsed @ (Value::Number(_) | Value::Object(_) | Value::Array(_))) => parsed,
                        _ => Value::String(s.clone()),
                    },
                    other => other.clone(),
                };
                (param.name.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponseBody {
    pub action_group: String,
    pub function: String,
    pub function_response: FunctionResponse,
}

/// Reply envelope for the agent runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub message_version: String,
    pub response: AgentResponseBody,
}

impl AgentResponse {
    fn new(event: &AgentEvent, document: &Value) -> Self {
        Self {
            message_version: MESSAGE_VERSION.to_string(),
            response: AgentResponseBody {
                action_group: event.action_group.clone(),
                function: event.function.clone(),
                function_response: FunctionResponse {
                    response_body: ResponseBody {
                        text: TextBody {
                            body: document.to_string(),
                        },
                    },
                },
            },
        }
    }

    /// Decoded body document
    pub fn document(&self) -> Option<Value> {
        serde_json::from_str(&self.response.function_response.response_body.text.body).ok()
    }
}

/// Dispatches boundary requests to the analyzer, with metrics and logging
#[derive(Clone)]
pub struct ActionHandler {
    analyzer: CostAnalyzer,
    metrics: AnalyzerMetrics,
    logger: StructuredLogger,
}

impl ActionHandler {
    pub fn new(analyzer: CostAnalyzer) -> Self {
        Self {
            analyzer,
            metrics: AnalyzerMetrics::new(),
            logger: StructuredLogger::new("cost-analyzer"),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn analyzer(&self) -> &CostAnalyzer {
        &self.analyzer
    }

    fn dispatch(&self, request: ActionRequest) -> CostResult<ActionResponse> {
        let analyzer = &self.analyzer;
        let response = match request {
            ActionRequest::EstimateServiceCost {
                service,
                configuration,
                region,
            } => ActionResponse::ServiceCost(analyzer.estimate_service_cost(
                &service,
                &configuration,
                region.as_deref(),
            )?),
            ActionRequest::CalculateTotalCost {
                architecture,
                region,
            } => {
                let estimate = analyzer.calculate_total_cost(&architecture, region.as_deref())?;
                self.metrics
                    .set_last_estimate_total(estimate.total_monthly_cost.to_f64().unwrap_or(0.0));
                ActionResponse::CostEstimate(estimate)
            }
            ActionRequest::ApplyAnzDiscounts { base_cost } => {
                ActionResponse::Discount(analyzer.apply_anz_discounts(base_cost)?)
            }
            ActionRequest::IdentifyCostOptimizations { breakdown } => {
                let ranked = optimizer::rank(analyzer.identify_cost_optimizations(&breakdown));
                ActionResponse::Optimizations(OptimizationReport::new(ranked)?)
            }
            ActionRequest::CompareCosts {
                onprem_cost,
                aws_cost,
            } => ActionResponse::Comparison(analyzer.compare_costs(onprem_cost, aws_cost)?),
        };
        Ok(response)
    }

    /// Run one parsed request
    pub fn handle(&self, request: ActionRequest) -> CostResult<ActionResponse> {
        let operation = request.operation();
        let started = Instant::now();
        let result = self.dispatch(request);
        let elapsed = started.elapsed().as_secs_f64();

        self.metrics.observe_request(operation.name(), elapsed);
        match &result {
            Ok(_) => self.logger.log_action(operation.name(), elapsed * 1000.0),
            Err(err) => {
                self.metrics.inc_errors(operation.name(), err.kind());
                self.logger.log_action_failed(operation.name(), err.kind(), &err.to_string());
            }
        }
        result
    }

    /// Parse and run a request document
    pub fn handle_value(&self, value: Value) -> CostResult<ActionResponse> {
        let request = ActionRequest::from_value(value).map_err(|err| {
            self.metrics.inc_errors("unparsed", err.kind());
            self.logger.log_action_failed("unparsed", err.kind(), &err.to_string());
            err
        })?;
        self.handle(request)
    }

    /// Parse and run a request document, answering with the boundary document
    pub fn handle_json(&self, value: Value) -> Value {
        to_document(&self.handle_value(value))
    }

    /// Answer an agent-runtime function call
    pub fn handle_agent_event(&self, event: &AgentEvent) -> AgentResponse {
        let result = match Operation::from_name(&event.function) {
            None => Err(invalid(format!("Unknown function: {}", event.function))),
            Some(expected) => ActionRequest::from_value(event.request_document()).and_then(|request| {
                if request.operation() == expected {
                    self.handle(request)
                } else {
                    Err(invalid(format!(
                        "function {} does not match the supplied parameters ({})",
                        expected,
                        request.operation()
                    )))
                }
            }),
        };
        AgentResponse::new(event, &to_document(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn handler() -> ActionHandler {
        ActionHandler::new(CostAnalyzer::aws_default())
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("delete_everything"), None);
    }

    #[test]
    fn test_request_selection_by_fields() {
        let cases = [
            (json!({"service": "Amazon EC2"}), Operation::EstimateServiceCost),
            (
                json!({"service": "Amazon EC2", "configuration": {}, "region": "us-west-2"}),
                Operation::EstimateServiceCost,
            ),
            (
                json!({"architecture": {"services": [{"service_name": "Amazon S3", "configuration": {}}]}}),
                Operation::CalculateTotalCost,
            ),
            (json!({"base_cost": 100}), Operation::ApplyAnzDiscounts),
            (
                json!({"breakdown": [{"service_name": "Amazon S3", "monthly_cost": 2.3, "unit_cost": 0.023, "units": 100, "pricing_model": "Per-GB"}]}),
                Operation::IdentifyCostOptimizations,
            ),
            (json!({"onprem_cost": 10, "aws_cost": 5}), Operation::CompareCosts),
        ];

        for (doc, expected) in cases {
            let request = ActionRequest::from_value(doc.clone()).unwrap();
            assert_eq!(request.operation(), expected, "{doc}");
        }
    }

    #[test]
    fn test_mixed_and_incomplete_payloads_rejected() {
        let cases = [
            json!({"service": "Amazon EC2", "base_cost": 10}),
            json!({"onprem_cost": 10}),
            json!({"base_cost": 10, "region": "us-east-1"}),
            json!({}),
            json!({"unknown": true}),
            json!([1, 2, 3]),
        ];

        for doc in cases {
            let err = ActionRequest::from_value(doc.clone()).unwrap_err();
            assert!(matches!(err, CostError::InvalidInput { .. }), "{doc}");
        }
    }

    #[test]
    fn test_numeric_strings_accepted_for_money() {
        let request = ActionRequest::from_value(json!({"base_cost": "5000.00"})).unwrap();
        assert_eq!(
            request,
            ActionRequest::ApplyAnzDiscounts {
                base_cost: dec!(5000.00)
            }
        );
        assert!(ActionRequest::from_value(json!({"base_cost": "five"})).is_err());
    }

    #[test]
    fn test_embedded_json_configuration_decoded() {
        let request = ActionRequest::from_value(json!({
            "service": "Amazon EC2",
            "configuration": "{\"instances\": 2}"
        }))
        .unwrap();
        match request {
            ActionRequest::EstimateServiceCost { configuration, .. } => {
                assert_eq!(configuration["instances"], json!(2));
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_handle_json_estimate() {
        let doc = handler().handle_json(json!({
            "service": "Amazon EC2",
            "configuration": {"instance_type": "t3.xlarge", "instances": 3, "pricing_model": "On-Demand"}
        }));
        assert_eq!(doc["service_name"], json!("Amazon EC2"));
        assert_eq!(doc["monthly_cost"], json!(364.42));
        assert_eq!(doc["pricing_model"], json!("On-Demand"));
    }

    #[test]
    fn test_handle_json_discount_and_compare() {
        let handler = handler();
        let discount = handler.handle_json(json!({"base_cost": 5000.00}));
        assert_eq!(discount["discount_amount"], json!(500.0));
        assert_eq!(discount["final_cost"], json!(4500.0));
        assert_eq!(discount["savings_percentage"], json!(10.0));

        let comparison = handler.handle_json(json!({"onprem_cost": 8000.00, "aws_cost": 5420.00}));
        assert_eq!(comparison["difference"], json!(-2580.0));
        assert_eq!(comparison["percentage_change"], json!(-32.25));
        assert!(comparison["breakeven_months"].is_null());
    }

    #[test]
    fn test_handle_json_errors_are_documents() {
        let handler = handler();

        let unknown = handler.handle_json(json!({"service": "Amazon Foo"}));
        assert_eq!(unknown["status"], json!("error"));
        assert!(unknown["message"].as_str().unwrap().contains("Amazon Foo"));

        let zero = handler.handle_json(json!({"onprem_cost": 0, "aws_cost": 100}));
        assert_eq!(zero["status"], json!("error"));

        let mixed = handler.handle_json(json!({"base_cost": 1, "aws_cost": 2}));
        assert_eq!(mixed["status"], json!("error"));
    }

    #[test]
    fn test_total_with_unknown_service_has_no_partial_estimate() {
        let doc = handler().handle_json(json!({
            "architecture": {"services": [
                {"service_name": "Amazon EC2", "configuration": {}},
                {"service_name": "Amazon Foo", "configuration": {}}
            ]}
        }));
        assert_eq!(doc["status"], json!("error"));
        assert!(doc.get("total_monthly_cost").is_none());
        assert!(doc.get("breakdown").is_none());
    }

    #[test]
    fn test_breakdown_answers_with_ranked_report() {
        let doc = handler().handle_json(json!({
            "breakdown": [
                {"service_name": "Amazon S3", "configuration": {}, "monthly_cost": 23.0,
                 "unit_cost": 0.023, "units": 1000, "pricing_model": "Per-GB"},
                {"service_name": "Amazon EC2", "configuration": {"instance_type": "t3.xlarge"},
                 "monthly_cost": 364.42, "unit_cost": 121.472, "units": 3, "pricing_model": "On-Demand"}
            ]
        }));

        assert_eq!(doc["count"], json!(3));
        let savings: Vec<f64> = doc["optimizations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["potential_savings"].as_f64().unwrap())
            .collect();
        assert_eq!(savings, vec![145.77, 91.1, 6.9]);
        assert_eq!(doc["total_potential_savings"], json!(243.77));
    }

    #[test]
    fn test_oversized_inputs_return_error_documents() {
        let handler = handler();
        let requests = [
            json!({"service": "AWS Lambda", "configuration": {"memory": 1e20, "avg_duration_ms": 1e20}}),
            json!({"service": "Amazon EBS", "configuration": {"size": 1e25, "volumes": 1.8e19}}),
            json!({"service": "Amazon EBS", "configuration": {"size": "1e25 GB", "volumes": 1.8e19}}),
            json!({"breakdown": [
                {"service_name": "Amazon EC2", "configuration": {"instance_type": "t3.xlarge"},
                 "monthly_cost": 7e28, "unit_cost": 7e28, "units": 1, "pricing_model": "On-Demand"},
                {"service_name": "Amazon EC2", "configuration": {"instance_type": "t3.xlarge"},
                 "monthly_cost": 7e28, "unit_cost": 7e28, "units": 1, "pricing_model": "On-Demand"}
            ]}),
        ];

        for request in &requests {
            let doc = handler.handle_json(request.clone());
            assert_eq!(doc["status"], json!("error"), "{request}");
            assert!(doc["message"].as_str().unwrap().starts_with("Invalid input"), "{request}");
        }

        let doc = handler.handle_json(requests[0].clone());
        assert_eq!(doc["message"], json!("Invalid input: AWS Lambda: cost overflows"));
    }

    #[test]
    fn test_breakdown_rejects_negative_cost() {
        let err = handler()
            .handle_value(json!({
                "breakdown": [{"service_name": "Amazon S3", "monthly_cost": -1,
                               "unit_cost": 0.023, "units": 1, "pricing_model": "Per-GB"}]
            }))
            .unwrap_err();
        assert!(matches!(err, CostError::InvalidInput { .. }));
    }

    fn event(function: &str, parameters: Value) -> AgentEvent {
        serde_json::from_value(json!({
            "messageVersion": "1.0",
            "actionGroup": "CostAnalysisActions",
            "function": function,
            "parameters": parameters
        }))
        .unwrap()
    }

    #[test]
    fn test_agent_event_estimate() {
        let response = handler().handle_agent_event(&event(
            "estimate_service_cost",
            json!([
                {"name": "service", "type": "string", "value": "Amazon EC2"},
                {"name": "configuration", "type": "string",
                 "value": "{\"instance_type\": \"t3.xlarge\", \"instances\": 3}"}
            ]),
        ));

        assert_eq!(response.message_version, "1.0");
        assert_eq!(response.response.action_group, "CostAnalysisActions");
        assert_eq!(response.response.function, "estimate_service_cost");
        let body = response.document().unwrap();
        assert_eq!(body["monthly_cost"], json!(364.42));
    }

    #[test]
    fn test_agent_event_discount_from_string_number() {
        let response = handler().handle_agent_event(&event(
            "apply_anz_discounts",
            json!([{"name": "base_cost", "type": "number", "value": "5000"}]),
        ));
        let body = response.document().unwrap();
        assert_eq!(body["final_cost"], json!(4500.0));
    }

    #[test]
    fn test_agent_event_mismatch_and_unknown_function() {
        let handler = handler();

        let mismatch = handler.handle_agent_event(&event(
            "compare_costs",
            json!([{"name": "base_cost", "value": "5000"}]),
        ));
        assert_eq!(mismatch.document().unwrap()["status"], json!("error"));

        let unknown = handler.handle_agent_event(&event("drop_tables", json!([])));
        let body = unknown.document().unwrap();
        assert_eq!(body["status"], json!("error"));
        assert!(body["message"].as_str().unwrap().contains("Unknown function"));
    }

    #[test]
    fn test_agent_response_serializes_runtime_shape() {
        let response = handler().handle_agent_event(&event(
            "compare_costs",
            json!([
                {"name": "onprem_cost", "value": "8000"},
                {"name": "aws_cost", "value": "5420"}
            ]),
        ));
        let value = serde_json::to_value(&response).unwrap();
        assert!(value["response"]["functionResponse"]["responseBody"]["TEXT"]["body"].is_string());
        assert_eq!(value["messageVersion"], json!("1.0"));
    }
}

use super::error::ReporterError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Free-form key-value metadata attached to a session or a test case.
pub type Baggage = serde_json::Map<String, JsonValue>;

/// Parses caller-supplied baggage. Only JSON objects are accepted.
pub fn parse_baggage(input: &str) -> Result<Baggage, ReporterError> {
    serde_json::from_str::<Baggage>(input)
        .map_err(|e| ReporterError::InvalidArgument(format!("cannot parse baggage: {e}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestcaseStatus {
    Pass,
    Fail,
    Error,
    Skip,
}

impl TestcaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestcaseStatus::Pass => "pass",
            TestcaseStatus::Fail => "fail",
            TestcaseStatus::Error => "error",
            TestcaseStatus::Skip => "skip",
        }
    }
}

impl fmt::Display for TestcaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestcaseStatus {
    type Err = ReporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(TestcaseStatus::Pass),
            "fail" => Ok(TestcaseStatus::Fail),
            "error" => Ok(TestcaseStatus::Error),
            "skip" => Ok(TestcaseStatus::Skip),
            other => Err(ReporterError::InvalidArgument(format!(
                "invalid testcase status: {other}"
            ))),
        }
    }
}

/// A single test case result, owned by the batcher once enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestcaseRequest {
    pub session_id: String,
    pub testcase_name: String,
    pub testcase_classname: Option<String>,
    pub testcase_file: Option<String>,
    pub testsuite: Option<String>,
    pub status: TestcaseStatus,
    pub output: Option<String>,
    pub baggage: Option<Baggage>,
}

impl TestcaseRequest {
    pub fn new(
        session_id: impl Into<String>,
        testcase_name: impl Into<String>,
        status: TestcaseStatus,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            testcase_name: testcase_name.into(),
            testcase_classname: None,
            testcase_file: None,
            testsuite: None,
            status,
            output: None,
            baggage: None,
        }
    }

    pub fn with_classname(mut self, classname: impl Into<String>) -> Self {
        self.testcase_classname = Some(classname.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.testcase_file = Some(file.into());
        self
    }

    pub fn with_testsuite(mut self, testsuite: impl Into<String>) -> Self {
        self.testsuite = Some(testsuite.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_baggage(mut self, baggage: Baggage) -> Self {
        self.baggage = Some(baggage);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_from_str() {
        assert_eq!("pass".parse::<TestcaseStatus>().unwrap(), TestcaseStatus::Pass);
        assert_eq!("fail".parse::<TestcaseStatus>().unwrap(), TestcaseStatus::Fail);
        assert_eq!("error".parse::<TestcaseStatus>().unwrap(), TestcaseStatus::Error);
        assert_eq!("skip".parse::<TestcaseStatus>().unwrap(), TestcaseStatus::Skip);

        let err = "PASSED".parse::<TestcaseStatus>().unwrap_err();
        assert_eq!(
            err,
            ReporterError::InvalidArgument("invalid testcase status: PASSED".to_string())
        );
    }

    #[test]
    fn test_parse_baggage() {
        let baggage = parse_baggage(r#"{"a": "b", "n": 1}"#).unwrap();
        assert_eq!(baggage.get("a"), Some(&json!("b")));
        assert_eq!(baggage.get("n"), Some(&json!(1)));

        // Arrays and scalars are not key-value metadata
        assert!(matches!(
            parse_baggage("[1, 2]"),
            Err(ReporterError::InvalidArgument(msg)) if msg.starts_with("cannot parse baggage")
        ));
        assert!(parse_baggage("{not json").is_err());
    }

    #[test]
    fn test_testcase_wire_format() {
        let testcase = TestcaseRequest::new("sess-1", "test_some_logic", TestcaseStatus::Pass)
            .with_classname("my_class")
            .with_file("my_file.py")
            .with_testsuite("some test suite");

        let value = serde_json::to_value(&testcase).unwrap();
        assert_eq!(
            value,
            json!({
                "sessionId": "sess-1",
                "testcaseName": "test_some_logic",
                "testcaseClassname": "my_class",
                "testcaseFile": "my_file.py",
                "testsuite": "some test suite",
                "status": "pass",
                "output": null,
                "baggage": null
            })
        );
    }
}

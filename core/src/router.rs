//! Output routing: classify each record's content and pick a presentation
//! channel for it.
//!
//! The routing policy is an explicit, ordered list of classifiers rather
//! than inline branching, so each rule is independently testable and new
//! content shapes can be slotted in. Content sniffing runs first; the only
//! verb-level override is the `clear` short-circuit.

use ccview_protocol::OutputRecord;
use serde_json::Value;

use crate::command::CommandKind;

/// Where a routed record ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedOutput {
    /// Reset every presentation channel; no text is emitted.
    Cleared,
    /// Verbatim transcript text.
    Plain(String),
    /// Structured or markup content for the syntax-highlighted channel.
    Structured(String),
}

/// One rule in the routing policy. Returns `None` to pass to the next rule.
pub trait ContentClassifier: Send + Sync {
    fn name(&self) -> &'static str;
    fn classify(&self, content: &str) -> Option<RoutedOutput>;
}

/// Structured-data documents go to the structured channel, re-serialized
/// with stable indentation.
struct JsonClassifier;

impl ContentClassifier for JsonClassifier {
    fn name(&self) -> &'static str {
        "json"
    }

    fn classify(&self, content: &str) -> Option<RoutedOutput> {
        let value: Value = serde_json::from_str(content.trim()).ok()?;
        let pretty = serde_json::to_string_pretty(&value).ok()?;
        Some(RoutedOutput::Structured(pretty))
    }
}

/// Markup reuses the structured channel's highlighting, verbatim.
struct MarkupClassifier;

impl ContentClassifier for MarkupClassifier {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn classify(&self, content: &str) -> Option<RoutedOutput> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('<') && trimmed.contains('>') {
            Some(RoutedOutput::Structured(content.to_string()))
        } else {
            None
        }
    }
}

pub struct OutputRouter {
    classifiers: Vec<Box<dyn ContentClassifier>>,
}

impl Default for OutputRouter {
    fn default() -> Self {
        Self {
            classifiers: vec![Box::new(JsonClassifier), Box::new(MarkupClassifier)],
        }
    }
}

impl OutputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, record: &OutputRecord, originating_verb: CommandKind) -> RoutedOutput {
        if originating_verb == CommandKind::Clear {
            return RoutedOutput::Cleared;
        }
        for classifier in &self.classifiers {
            if let Some(routed) = classifier.classify(&record.content) {
                tracing::debug!(classifier = classifier.name(), "routed output");
                return routed;
            }
        }
        RoutedOutput::Plain(record.content.clone())
    }
}

/// An append-only, independently clearable sink for transcript text. The
/// panel provides the real implementations.
pub trait PresentationChannel: Send {
    fn append(&mut self, text: &str);
    fn clear(&mut self);
}

/// The two sinks every panel exposes: plain transcript text and
/// structured/syntax-highlighted content.
pub struct PanelSinks {
    pub transcript: Box<dyn PresentationChannel>,
    pub structured: Box<dyn PresentationChannel>,
}

impl PanelSinks {
    pub fn apply(&mut self, routed: &RoutedOutput) {
        match routed {
            RoutedOutput::Cleared => {
                self.transcript.clear();
                self.structured.clear();
            }
            RoutedOutput::Plain(text) => self.transcript.append(text),
            RoutedOutput::Structured(text) => self.structured.append(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use ccview_protocol::OutputRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn route(content: &str, verb: CommandKind) -> RoutedOutput {
        OutputRouter::new().route(&OutputRecord::primary(content), verb)
    }

    #[test]
    fn structured_payloads_round_trip_through_formatting() {
        let original = json!({"energies": [1.5, 2.5], "natom": 3});
        let routed = route(&original.to_string(), CommandKind::DataQuery);
        let RoutedOutput::Structured(pretty) = routed else {
            panic!("expected structured routing");
        };
        let reparsed: Value = serde_json::from_str(&pretty).expect("round trip");
        assert_eq!(reparsed, original);
    }

    #[test]
    fn already_pretty_exports_stay_structured() {
        let pretty = serde_json::to_string_pretty(&json!({"a": 1})).expect("pretty");
        let routed = route(&pretty, CommandKind::DataExport);
        assert_eq!(routed, RoutedOutput::Structured(pretty));
    }

    #[test]
    fn markup_reuses_the_structured_channel() {
        let content = "<molecule id=\"water\"></molecule>";
        assert_eq!(
            route(content, CommandKind::DataQuery),
            RoutedOutput::Structured(content.to_string())
        );
    }

    #[test]
    fn a_lone_angle_bracket_is_not_markup() {
        let content = "< incomplete";
        assert_eq!(
            route(content, CommandKind::DataQuery),
            RoutedOutput::Plain(content.to_string())
        );
    }

    #[test]
    fn plain_text_routes_verbatim() {
        let content = "Error: Property foo not available";
        assert_eq!(
            route(content, CommandKind::DataQuery),
            RoutedOutput::Plain(content.to_string())
        );
    }

    #[test]
    fn clear_short_circuits_before_classification() {
        assert_eq!(route("{}", CommandKind::Clear), RoutedOutput::Cleared);
    }

    #[test]
    fn sinks_apply_routing_and_reset_together() {
        #[derive(Default)]
        struct Recorder(std::sync::Arc<std::sync::Mutex<Vec<String>>>);
        impl PresentationChannel for Recorder {
            fn append(&mut self, text: &str) {
                self.0.lock().expect("lock").push(text.to_string());
            }
            fn clear(&mut self) {
                self.0.lock().expect("lock").clear();
            }
        }

        let plain = Recorder::default();
        let plain_log = plain.0.clone();
        let structured = Recorder::default();
        let structured_log = structured.0.clone();
        let mut sinks = PanelSinks {
            transcript: Box::new(plain),
            structured: Box::new(structured),
        };

        sinks.apply(&RoutedOutput::Plain("hello".to_string()));
        sinks.apply(&RoutedOutput::Structured("{}".to_string()));
        assert_eq!(plain_log.lock().expect("lock").len(), 1);
        assert_eq!(structured_log.lock().expect("lock").len(), 1);

        sinks.apply(&RoutedOutput::Cleared);
        assert!(plain_log.lock().expect("lock").is_empty());
        assert!(structured_log.lock().expect("lock").is_empty());
    }
}

// JUnit formatter - accumulates one suite and renders it as JUnit XML

use super::{Formatter, ReportError};
use crate::event::{ExampleStatus, ReporterEvent, StatusSymbol};
use crate::state::{Case, FailureDetail, Outcome, Suite};
use crate::time::Elapsed;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_CAUSE_TYPE: &str = "Exception";

/// Knobs for the JUnit formatter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunitOptions {
    /// Suite name used when status events arrive before any `start`
    pub fallback_suite_name: String,
    /// `type` attribute for failures whose cause carries no type
    pub default_cause_type: String,
    /// Spaces per nesting level; 0 renders everything on one line
    pub indent: usize,
}

impl Default for JunitOptions {
    fn default() -> Self {
        Self {
            fallback_suite_name: String::new(),
            default_cause_type: DEFAULT_CAUSE_TYPE.to_string(),
            indent: 2,
        }
    }
}

/// JUnit formatter
#[derive(Debug, Clone)]
pub struct JunitFormatter {
    options: JunitOptions,
    suite: Suite,
    started: bool,
}

impl Default for JunitFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JunitFormatter {
    pub fn new() -> Self {
        Self::with_options(JunitOptions::default())
    }

    pub fn with_options(options: JunitOptions) -> Self {
        let suite = Suite::new(options.fallback_suite_name.clone());
        Self {
            options,
            suite,
            started: false,
        }
    }

    pub fn suite(&self) -> &Suite {
        &self.suite
    }

    pub fn is_finished(&self) -> bool {
        self.suite.is_closed()
    }

    /// Write the finished report to `path`
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let xml = self.output()?;

        let mut file = File::create(path).with_context(|| {
            format!("Failed to create JUnit report file: {}", path.display())
        })?;

        file.write_all(xml.as_bytes())
            .context("Failed to write JUnit XML content")?;

        Ok(())
    }

    fn start_suite(&mut self, name: &str) {
        if self.started {
            debug!(previous = %self.suite.name(), "Suite restarted, discarding accumulated cases");
        }
        self.suite = Suite::new(name);
        self.started = true;
    }

    fn record_status(&mut self, status: &ExampleStatus) {
        if !self.started {
            warn!(
                example = %status.name,
                "Status event before start, using suite name '{}'",
                self.suite.name()
            );
            self.started = true;
        }
        if self.suite.is_closed() {
            warn!(example = %status.name, "Status event after finish ignored");
            return;
        }

        if let StatusSymbol::Unknown(symbol) = &status.symbol {
            if symbol.is_empty() {
                warn!(
                    example = %status.name,
                    "Status event without a symbol, recording example as passed"
                );
            } else {
                warn!(
                    example = %status.name,
                    "Unrecognised status symbol '{}', recording example as passed",
                    symbol
                );
            }
        }
        if status.name.is_empty() {
            warn!("Status event without an example name");
        }

        let outcome = Outcome::classify(&status.symbol);
        let time = status.time.clone().unwrap_or_else(|| {
            debug!(example = %status.name, "Status event without time, using 0");
            Elapsed::zero()
        });
        let type_name = status
            .cause
            .as_ref()
            .map(|c| c.type_name.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(self.options.default_cause_type.as_str())
            .to_string();
        let detail = FailureDetail::new(
            outcome,
            &status.name,
            &status.message,
            status.trace.as_deref(),
            type_name,
        );

        debug!(example = %status.name, ?outcome, "Recorded example");
        let class = self.suite.name().to_string();
        self.suite.push(Case {
            class,
            name: status.name.clone(),
            time,
            outcome,
            detail,
        });
    }

    fn finish_suite(&mut self, time: Option<&Elapsed>) {
        if self.suite.is_closed() {
            warn!("Duplicate finish event ignored");
            return;
        }
        if !self.started {
            warn!("Finish event before start");
        }
        self.suite.close(time.cloned());
    }
}

impl Formatter for JunitFormatter {
    fn update(&mut self, event: &ReporterEvent) {
        match event {
            ReporterEvent::Start { name, .. } => self.start_suite(name),
            ReporterEvent::Status(status) => self.record_status(status),
            ReporterEvent::Finish { time, .. } => self.finish_suite(time.as_ref()),
        }
    }

    fn output(&self) -> Result<String, ReportError> {
        let time = self.suite.time().ok_or(ReportError::SuiteNotFinished)?;
        Ok(render(&self.suite, time, self.options.indent))
    }
}

/// Render a suite as a JUnit XML document.
///
/// Pure function of its inputs: attribute order is fixed (`name tests failures
/// errors time` on the suite, `class name time` on each case) and cases are
/// written in insertion order.
pub fn render(suite: &Suite, time: &Elapsed, indent: usize) -> String {
    let mut out = XmlOut::new(indent);
    out.raw("<?xml version=\"1.0\"?>\n");
    out.open("testsuites", &[], 0);

    let counters = suite.counters();
    let suite_attrs = [
        ("name", suite.name().to_string()),
        ("tests", counters.tests.to_string()),
        ("failures", counters.failures.to_string()),
        ("errors", counters.errors.to_string()),
        ("time", time.to_string()),
    ];

    if suite.cases().is_empty() {
        out.empty("testsuite", &suite_attrs, 1);
    } else {
        out.open("testsuite", &suite_attrs, 1);
        for case in suite.cases() {
            let case_attrs = [
                ("class", case.class.clone()),
                ("name", case.name.clone()),
                ("time", case.time.to_string()),
            ];
            match &case.detail {
                None => out.empty("testcase", &case_attrs, 2),
                Some(detail) => {
                    out.open("testcase", &case_attrs, 2);
                    out.text_element(
                        detail.kind.tag(),
                        &[("type", detail.type_name.clone())],
                        &detail.body,
                        3,
                    );
                    out.close("testcase", 2);
                }
            }
        }
        out.close("testsuite", 1);
    }

    out.close("testsuites", 0);
    out.finish()
}

struct XmlOut {
    buf: String,
    indent: usize,
}

impl XmlOut {
    fn new(indent: usize) -> Self {
        Self {
            buf: String::new(),
            indent,
        }
    }

    fn raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn begin_line(&mut self, depth: usize) {
        if self.indent > 0 {
            self.buf.push_str(&" ".repeat(self.indent * depth));
        }
    }

    fn end_line(&mut self) {
        if self.indent > 0 {
            self.buf.push('\n');
        }
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.buf.push('<');
        self.buf.push_str(tag);
        for (key, value) in attrs {
            self.buf.push_str(&format!(" {}=\"{}\"", key, escape_attr(value)));
        }
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, String)], depth: usize) {
        self.begin_line(depth);
        self.start_tag(tag, attrs);
        self.buf.push('>');
        self.end_line();
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, String)], depth: usize) {
        self.begin_line(depth);
        self.start_tag(tag, attrs);
        self.buf.push_str("/>");
        self.end_line();
    }

    // Text content is written verbatim, no indentation inside it.
    fn text_element(&mut self, tag: &str, attrs: &[(&str, String)], text: &str, depth: usize) {
        self.begin_line(depth);
        self.start_tag(tag, attrs);
        self.buf.push('>');
        self.buf.push_str(&escape_text(text));
        self.buf.push_str(&format!("</{}>", tag));
        self.end_line();
    }

    fn close(&mut self, tag: &str, depth: usize) {
        self.begin_line(depth);
        self.buf.push_str(&format!("</{}>", tag));
        self.end_line();
    }

    fn finish(mut self) -> String {
        if !self.buf.ends_with('\n') {
            self.buf.push('\n');
        }
        self.buf
    }
}

// Characters XML 1.0 forbids even as references (ANSI escapes, NUL, U+FFFE/F)
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn escape_text(s: &str) -> String {
    s.chars()
        .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
        .collect::<String>()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\r', "&#13;")
}

// Attribute values also need quotes and whitespace escaped, otherwise parsers
// normalise newlines and tabs to spaces.
fn escape_attr(s: &str) -> String {
    escape_text(s)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Cause;

    fn t(s: &str) -> Elapsed {
        s.parse().unwrap()
    }

    fn finished(events: &[ReporterEvent]) -> JunitFormatter {
        let mut formatter = JunitFormatter::new();
        formatter.update(&ReporterEvent::start("Dummy"));
        for event in events {
            formatter.update(event);
        }
        formatter.update(&ReporterEvent::finish());
        formatter
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_text("\"quoted\"\n"), "\"quoted\"\n");
    }

    #[test]
    fn test_escape_replaces_control_characters() {
        assert_eq!(
            escape_text("\u{1b}[31mred\u{1b}[0m\0"),
            "\u{FFFD}[31mred\u{FFFD}[0m\u{FFFD}"
        );
        assert_eq!(escape_attr("a\u{7}b\u{FFFF}"), "a\u{FFFD}b\u{FFFD}");
        assert_eq!(escape_text("tab\tok \u{10348}"), "tab\tok \u{10348}");
    }

    #[test]
    fn test_ansi_colours_never_reach_output() {
        let formatter = finished(&[ReporterEvent::status(
            ExampleStatus::new("F", "coloured")
                .with_message("\u{1b}[31mred\u{1b}[0m")
                .with_trace("\u{1b}[2m#0 {main}\u{1b}[0m"),
        )]);
        let xml = formatter.output().unwrap();
        assert!(!xml.contains('\u{1b}'));
        assert!(xml.contains("\u{FFFD}[31mred\u{FFFD}[0m"));
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("say \"hi\"\n\tnow"), "say &quot;hi&quot;&#10;&#9;now");
    }

    #[test]
    fn test_output_before_finish_is_error() {
        let mut formatter = JunitFormatter::new();
        formatter.update(&ReporterEvent::start("Dummy"));
        assert_eq!(formatter.output(), Err(ReportError::SuiteNotFinished));
    }

    #[test]
    fn test_empty_suite_is_self_closing() {
        let formatter = finished(&[]);
        let xml = formatter.output().unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<testsuites>\n  <testsuite name=\"Dummy\" tests=\"0\" failures=\"0\" errors=\"0\" time=\"0\"/>\n</testsuites>\n"
        );
    }

    #[test]
    fn test_compact_rendering() {
        let mut formatter = JunitFormatter::with_options(JunitOptions {
            indent: 0,
            ..JunitOptions::default()
        });
        formatter.update(&ReporterEvent::start("Dummy"));
        formatter.update(&ReporterEvent::status(
            ExampleStatus::new(".", "example1").with_time(t("0.01")),
        ));
        formatter.update(&ReporterEvent::finish());

        assert_eq!(
            formatter.output().unwrap(),
            "<?xml version=\"1.0\"?>\n<testsuites><testsuite name=\"Dummy\" tests=\"1\" failures=\"0\" errors=\"0\" time=\"0.01\"><testcase class=\"Dummy\" name=\"example1\" time=\"0.01\"/></testsuite></testsuites>\n"
        );
    }

    #[test]
    fn test_cause_type_used_for_type_attribute() {
        let formatter = finished(&[ReporterEvent::status(
            ExampleStatus::new("F", "example1")
                .with_message("m")
                .with_trace("T")
                .with_cause(Cause::new("LogicException"))
                .with_time(t("0.01")),
        )]);
        let xml = formatter.output().unwrap();
        assert!(xml.contains("<failure type=\"LogicException\">"));
    }

    #[test]
    fn test_empty_cause_type_falls_back() {
        let formatter = finished(&[ReporterEvent::status(
            ExampleStatus::new("E", "example1").with_cause(Cause::new("")),
        )]);
        let xml = formatter.output().unwrap();
        assert!(xml.contains("<error type=\"Exception\">"));
    }

    #[test]
    fn test_configured_default_cause_type() {
        let mut formatter = JunitFormatter::with_options(JunitOptions {
            default_cause_type: "AssertionError".to_string(),
            ..JunitOptions::default()
        });
        formatter.update(&ReporterEvent::start("S"));
        formatter.update(&ReporterEvent::status(ExampleStatus::new("F", "x")));
        formatter.update(&ReporterEvent::finish());
        assert!(formatter.output().unwrap().contains("type=\"AssertionError\""));
    }

    #[test]
    fn test_status_before_start_uses_fallback_name() {
        let mut formatter = JunitFormatter::with_options(JunitOptions {
            fallback_suite_name: "default".to_string(),
            ..JunitOptions::default()
        });
        formatter.update(&ReporterEvent::status(ExampleStatus::new(".", "x")));
        formatter.update(&ReporterEvent::finish());

        let suite = formatter.suite();
        assert_eq!(suite.name(), "default");
        assert_eq!(suite.cases()[0].class, "default");
    }

    #[test]
    fn test_restart_discards_previous_cases() {
        let mut formatter = JunitFormatter::new();
        formatter.update(&ReporterEvent::start("First"));
        formatter.update(&ReporterEvent::status(ExampleStatus::new("F", "x")));
        formatter.update(&ReporterEvent::start("Second"));
        formatter.update(&ReporterEvent::finish());

        assert_eq!(formatter.suite().name(), "Second");
        assert_eq!(formatter.suite().counters().tests, 0);
    }

    #[test]
    fn test_status_after_finish_ignored() {
        let mut formatter = finished(&[]);
        formatter.update(&ReporterEvent::status(ExampleStatus::new("F", "late")));
        assert_eq!(formatter.suite().counters().tests, 0);
    }

    #[test]
    fn test_finish_time_overrides_case_sum() {
        let mut formatter = JunitFormatter::new();
        formatter.update(&ReporterEvent::start("S"));
        formatter.update(&ReporterEvent::status(
            ExampleStatus::new(".", "a").with_time(t("0.01")),
        ));
        formatter.update(&ReporterEvent::finish_with_time(t("0.250")));
        assert!(formatter.output().unwrap().contains("time=\"0.250\">"));
    }

    #[test]
    fn test_body_is_escaped() {
        let formatter = finished(&[ReporterEvent::status(
            ExampleStatus::new("F", "a<b").with_message("x & y"),
        )]);
        let xml = formatter.output().unwrap();
        assert!(xml.contains("name=\"a&lt;b\""));
        assert!(xml.contains("\na&lt;b (FAILED)\nx &amp; y\n\n</failure>"));
    }
}

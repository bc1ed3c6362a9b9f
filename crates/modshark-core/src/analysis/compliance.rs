use std::collections::BTreeMap;

use crate::layers::DecodeError;
use crate::protocols::modbus::{Mbap, MbapError, layout};
use crate::{ComplianceSummary, Violation};

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    id: &'static str,
    severity: Severity,
    message: &'static str,
}

const TOO_SHORT: Rule = Rule {
    id: "LS-MODBUS-TOO-SHORT",
    severity: Severity::Error,
    message: "Payload shorter than the 7-byte MBAP header",
};
const PROTOCOL_ID: Rule = Rule {
    id: "LS-MODBUS-PROTOCOL-ID",
    severity: Severity::Error,
    message: "Non-zero MBAP protocol identifier",
};
const LENGTH: Rule = Rule {
    id: "LS-MODBUS-LENGTH",
    severity: Severity::Error,
    message: "MBAP length field leaves no room for the unit identifier",
};
const TRUNCATED: Rule = Rule {
    id: "LS-MODBUS-TRUNCATED",
    severity: Severity::Error,
    message: "MBAP length field exceeds the bytes in the segment",
};
const TRAILING_BYTES: Rule = Rule {
    id: "LS-MODBUS-TRAILING-BYTES",
    severity: Severity::Warning,
    message: "Segment carries bytes past the declared MBAP record",
};
const OVERSIZE: Rule = Rule {
    id: "LS-MODBUS-OVERSIZE",
    severity: Severity::Warning,
    message: "MBAP length exceeds the 253-byte Modbus PDU limit",
};
const EMPTY_PDU: Rule = Rule {
    id: "LS-MODBUS-EMPTY-PDU",
    severity: Severity::Warning,
    message: "MBAP record carries no function code",
};

fn rule_for_error(error: &DecodeError) -> Rule {
    match error {
        DecodeError::Mbap(MbapError::TooShort { .. }) => TOO_SHORT,
        DecodeError::Mbap(MbapError::UnsupportedProtocol { .. }) => PROTOCOL_ID,
        DecodeError::Mbap(MbapError::InvalidLength { .. } | MbapError::PduTooLarge { .. }) => {
            LENGTH
        }
        DecodeError::Mbap(MbapError::Truncated { .. }) => TRUNCATED,
    }
}

#[derive(Debug)]
struct RuleStats {
    rule: Rule,
    count: u64,
    examples: Vec<String>,
}

/// Per-protocol compliance counters.
#[derive(Debug, Default)]
pub(crate) struct ComplianceStats {
    checked: u64,
    violating: u64,
    rules: BTreeMap<&'static str, RuleStats>,
}

impl ComplianceStats {
    /// Check a decoded record; `context` is used as an example when it violates a rule.
    pub(crate) fn check_record(&mut self, mbap: &Mbap<'_>, context: &str) {
        let mut hits = Vec::new();
        if !mbap.trailing.is_empty() {
            hits.push(TRAILING_BYTES);
        }
        if mbap.length > layout::MAX_LENGTH {
            hits.push(OVERSIZE);
        }
        if mbap.payload.is_empty() {
            hits.push(EMPTY_PDU);
        }

        self.checked += 1;
        if !hits.is_empty() {
            self.violating += 1;
        }
        for rule in hits {
            self.hit(rule, context);
        }
    }

    pub(crate) fn record_failure(&mut self, error: &DecodeError, context: &str) {
        self.checked += 1;
        self.violating += 1;
        self.hit(rule_for_error(error), context);
    }

    fn hit(&mut self, rule: Rule, context: &str) {
        let entry = self.rules.entry(rule.id).or_insert_with(|| RuleStats {
            rule,
            count: 0,
            examples: Vec::new(),
        });
        entry.count += 1;
        if entry.examples.len() < MAX_EXAMPLES {
            entry.examples.push(context.to_string());
        }
    }

    pub(crate) fn into_summary(self, protocol: &str) -> ComplianceSummary {
        let compliance_percentage = if self.checked == 0 {
            100.0
        } else {
            (self.checked - self.violating) as f64 / self.checked as f64 * 100.0
        };

        let mut stats: Vec<RuleStats> = self.rules.into_values().collect();
        stats.sort_by(|a, b| {
            a.rule
                .severity
                .cmp(&b.rule.severity)
                .then_with(|| a.rule.id.cmp(b.rule.id))
        });

        ComplianceSummary {
            protocol: protocol.to_string(),
            compliance_percentage,
            violations: stats
                .into_iter()
                .map(|entry| Violation {
                    id: entry.rule.id.to_string(),
                    severity: entry.rule.severity.as_str().to_string(),
                    message: entry.rule.message.to_string(),
                    count: entry.count,
                    examples: entry.examples,
                })
                .collect(),
        }
    }
}

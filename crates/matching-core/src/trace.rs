//! Scoring trace recorder. Disabled contexts are a unit variant: every
//! operation returns immediately, lazy payload closures are never called,
//! and no event storage exists. Enabled contexts accumulate events behind
//! a mutex and produce an immutable `ScoringTrace` when finished.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Mutex;
use std::time::Instant;

use watchgate_core::{ScoreBreakdown, ScoringTrace, TraceEvent, TracePhase};

pub enum ScoringContext {
    Disabled,
    Enabled(Recorder),
}

pub struct Recorder {
    session_id: String,
    started: Instant,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    events: Vec<TraceEvent>,
    metadata: BTreeMap<String, String>,
    breakdown: Option<ScoreBreakdown>,
}

impl ScoringContext {
    pub fn disabled() -> Self {
        ScoringContext::Disabled
    }

    pub fn enabled(session_id: impl Into<String>) -> Self {
        ScoringContext::Enabled(Recorder {
            session_id: session_id.into(),
            started: Instant::now(),
            inner: Mutex::new(Inner::default()),
        })
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        matches!(self, ScoringContext::Enabled(_))
    }

    #[inline]
    pub fn record(&self, phase: TracePhase, description: &str) {
        if let ScoringContext::Enabled(recorder) = self {
            recorder.push(phase, description, None, None, None);
        }
    }

    /// Records an event with a payload. The closure only runs when the
    /// context is enabled, so payload construction costs nothing on the
    /// disabled path.
    #[inline]
    pub fn record_with<F>(&self, phase: TracePhase, description: &str, data: F)
    where
        F: FnOnce() -> serde_json::Value,
    {
        if let ScoringContext::Enabled(recorder) = self {
            recorder.push(phase, description, None, None, Some(data()));
        }
    }

    /// Runs `op`, recording its duration when enabled.
    #[inline]
    pub fn traced<T>(&self, phase: TracePhase, description: &str, op: impl FnOnce() -> T) -> T {
        match self {
            ScoringContext::Disabled => op(),
            ScoringContext::Enabled(recorder) => {
                let begun = Instant::now();
                let out = op();
                recorder.push(
                    phase,
                    description,
                    Some(millis_since(begun)),
                    Some(true),
                    None,
                );
                out
            }
        }
    }

    /// Like `traced` for fallible operations: duration and outcome are
    /// recorded, the error is propagated untouched.
    #[inline]
    pub fn try_traced<T, E: Display>(
        &self,
        phase: TracePhase,
        description: &str,
        op: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        match self {
            ScoringContext::Disabled => op(),
            ScoringContext::Enabled(recorder) => {
                let begun = Instant::now();
                let out = op();
                let (ok, data) = match &out {
                    Ok(_) => (true, None),
                    Err(e) => (false, Some(serde_json::json!({ "error": e.to_string() }))),
                };
                recorder.push(phase, description, Some(millis_since(begun)), Some(ok), data);
                out
            }
        }
    }

    #[inline]
    pub fn with_metadata(&self, key: &str, value: &str) {
        if let ScoringContext::Enabled(recorder) = self {
            if let Ok(mut inner) = recorder.inner.lock() {
                inner.metadata.insert(key.to_string(), value.to_string());
            }
        }
    }

    #[inline]
    pub fn with_breakdown(&self, breakdown: &ScoreBreakdown) {
        if let ScoringContext::Enabled(recorder) = self {
            if let Ok(mut inner) = recorder.inner.lock() {
                inner.breakdown = Some(breakdown.clone());
            }
        }
    }

    /// Consumes the context and produces the immutable trace, or `None`
    /// for a disabled context.
    pub fn finish(self) -> Option<ScoringTrace> {
        match self {
            ScoringContext::Disabled => None,
            ScoringContext::Enabled(recorder) => {
                let duration_ms = millis_since(recorder.started);
                let inner = recorder.inner.into_inner().unwrap_or_default();
                Some(ScoringTrace {
                    session_id: recorder.session_id,
                    duration_ms,
                    events: inner.events,
                    metadata: inner.metadata,
                    breakdown: inner.breakdown,
                })
            }
        }
    }
}

impl Recorder {
    fn push(
        &self,
        phase: TracePhase,
        description: &str,
        duration_ms: Option<f64>,
        ok: Option<bool>,
        data: Option<serde_json::Value>,
    ) {
        if let Ok(mut inner) = self.inner.lock() {
            let at_ms = millis_since(self.started);
            inner.events.push(TraceEvent {
                phase,
                description: description.to_string(),
                at_ms,
                duration_ms,
                ok,
                data,
            });
        }
    }
}

fn millis_since(instant: Instant) -> f64 {
    instant.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_context_yields_no_trace() {
        let ctx = ScoringContext::disabled();
        ctx.record(TracePhase::Normalization, "noop");
        ctx.record_with(TracePhase::Aggregation, "noop", || {
            panic!("lazy payload must not run when disabled")
        });
        assert!(!ctx.is_enabled());
        assert!(ctx.finish().is_none());
    }

    #[test]
    fn enabled_context_accumulates_events() {
        let ctx = ScoringContext::enabled("session-1");
        ctx.record(TracePhase::NameComparison, "primary vs primary");
        ctx.record_with(TracePhase::Aggregation, "weights", || {
            serde_json::json!({ "name": 40 })
        });
        ctx.with_metadata("candidate", "ofac-123");
        let value = ctx.traced(TracePhase::DateComparison, "dates", || 7);
        assert_eq!(value, 7);

        let trace = ctx.finish().unwrap();
        assert_eq!(trace.session_id, "session-1");
        assert_eq!(trace.events.len(), 3);
        assert_eq!(trace.metadata.get("candidate").map(String::as_str), Some("ofac-123"));
        assert!(trace.events[2].duration_ms.is_some());
    }

    #[test]
    fn try_traced_captures_errors_and_propagates() {
        let ctx = ScoringContext::enabled("session-2");
        let result: Result<(), String> =
            ctx.try_traced(TracePhase::GovIdComparison, "ids", || Err("boom".to_string()));
        assert!(result.is_err());

        let trace = ctx.finish().unwrap();
        assert_eq!(trace.events[0].ok, Some(false));
        assert!(trace.events[0].data.as_ref().unwrap()["error"]
            .as_str()
            .unwrap()
            .contains("boom"));
    }
}

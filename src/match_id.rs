//! Parsing of compound match identifiers
//!
//! Search results identify their location with a `;`-separated string such as
//!
//! ```text
//! g_3;em_11_23;n_19985-n_20003;p_4;#=ew_0_12611;prefix=001-
//! AgnesShacklock-01.trs;60.897-67.922;prefix=001-
//! ```
//!
//! The first segment is always the graph (transcript) id. One further segment holds the
//! interval, either as a pair of anchor ids (`n_…-n_…`) or as a pair of offsets in seconds.
//! The rest are keyed segments recognised by their prefix; anything unrecognised is ignored so
//! newer servers can add segments without breaking older clients.

use std::fmt;
use std::str::FromStr;

const PREFIX_KEY: &str = "prefix=";
const TARGET_KEY: &str = "#=";
const PARTICIPANT_MARKER: &str = "p_";
const UTTERANCE_MARKER: &str = "em_";
const ANCHOR_MARKER: &str = "n_";

/// Interval covered by a match
#[derive(Clone, Debug, PartialEq)]
pub enum MatchInterval {
    /// Start and end anchor ids
    Anchors {
        /// Start anchor id
        start: String,
        /// End anchor id
        end: String,
    },
    /// Start and end offsets in seconds
    Offsets {
        /// Start offset
        start: f64,
        /// End offset
        end: f64,
    },
}

/// A parsed match identifier
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchId {
    /// Graph (transcript) id
    pub graph_id: String,
    /// Matched interval, anchors or offsets
    pub interval: Option<MatchInterval>,
    /// Utterance annotation id
    pub utterance_id: Option<String>,
    /// Participant id
    pub participant_id: Option<String>,
    /// Target annotation id
    pub target_id: Option<String>,
    /// Result prefix
    pub prefix: Option<String>,
}

impl MatchId {
    /// Parse a match identifier
    ///
    /// Never fails: missing or unrecognised segments leave the corresponding fields empty.
    ///
    /// ```
    /// use labbcat::MatchId;
    ///
    /// let id = MatchId::parse("AgnesShacklock-01.trs;60.897-67.922;prefix=001-");
    /// assert_eq!(id.graph_id, "AgnesShacklock-01.trs");
    /// assert_eq!(id.start_offset(), Some(60.897));
    /// assert_eq!(id.end_offset(), Some(67.922));
    /// assert_eq!(id.start_anchor_id(), None);
    /// assert_eq!(id.prefix.as_deref(), Some("001-"));
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut segments = text.split(';');
        let mut id = MatchId {
            graph_id: segments.next().unwrap_or_default().to_string(),
            ..Default::default()
        };

        for segment in segments {
            if let Some(prefix) = segment.strip_prefix(PREFIX_KEY) {
                id.prefix = Some(prefix.to_string());
            } else if let Some(target) = segment.strip_prefix(TARGET_KEY) {
                id.target_id = Some(target.to_string());
            } else if segment.starts_with(UTTERANCE_MARKER) {
                id.utterance_id = Some(segment.to_string());
            } else if segment.starts_with(PARTICIPANT_MARKER) {
                id.participant_id = Some(segment.to_string());
            } else if id.interval.is_none() {
                id.interval = parse_interval(segment);
            }
        }
        id
    }

    /// Start anchor id, when the interval is anchor-based
    pub fn start_anchor_id(&self) -> Option<&str> {
        match &self.interval {
            Some(MatchInterval::Anchors { start, .. }) => Some(start),
            _ => None,
        }
    }

    /// End anchor id, when the interval is anchor-based
    pub fn end_anchor_id(&self) -> Option<&str> {
        match &self.interval {
            Some(MatchInterval::Anchors { end, .. }) => Some(end),
            _ => None,
        }
    }

    /// Start offset, when the interval is offset-based
    pub fn start_offset(&self) -> Option<f64> {
        match self.interval {
            Some(MatchInterval::Offsets { start, .. }) => Some(start),
            _ => None,
        }
    }

    /// End offset, when the interval is offset-based
    pub fn end_offset(&self) -> Option<f64> {
        match self.interval {
            Some(MatchInterval::Offsets { end, .. }) => Some(end),
            _ => None,
        }
    }
}

/// Split `a-b` at its first `-`, skipping a leading sign on the start offset
fn parse_interval(segment: &str) -> Option<MatchInterval> {
    let split_at = segment
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(i, _)| i)?;
    let (start, end) = (&segment[..split_at], &segment[split_at + 1..]);

    if start.starts_with(ANCHOR_MARKER) {
        return Some(MatchInterval::Anchors {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    match (start.parse::<f64>(), end.parse::<f64>()) {
        (Ok(start), Ok(end)) => Some(MatchInterval::Offsets { start, end }),
        _ => None,
    }
}

impl FromStr for MatchId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MatchId::parse(s))
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.graph_id)?;
        if let Some(utterance) = &self.utterance_id {
            write!(f, ";{}", utterance)?;
        }
        match &self.interval {
            Some(MatchInterval::Anchors { start, end }) => write!(f, ";{}-{}", start, end)?,
            Some(MatchInterval::Offsets { start, end }) => write!(f, ";{}-{}", start, end)?,
            None => {}
        }
        if let Some(participant) = &self.participant_id {
            write!(f, ";{}", participant)?;
        }
        if let Some(target) = &self.target_id {
            write!(f, ";{}{}", TARGET_KEY, target)?;
        }
        if let Some(prefix) = &self.prefix {
            write!(f, ";{}{}", PREFIX_KEY, prefix)?;
        }
        Ok(())
    }
}

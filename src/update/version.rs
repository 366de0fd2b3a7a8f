use anyhow::Result;
use std::cmp::Ordering;
use std::fmt;

/// A release version reduced to its numeric segments.
///
/// `"v1.2.3-beta"` parses to segments `[1, 2, 3]` with suffix `"-beta"`. Only the
/// segments take part in ordering and equality; the prefix and suffix are kept
/// for display.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    segments: Vec<u64>,
    suffix: String,
}

impl Version {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(anyhow::anyhow!("Version string is empty"));
        }

        let without_prefix = trimmed.trim_start_matches(|c: char| !c.is_ascii_digit());
        let core_end = without_prefix
            .find(['-', '+'])
            .unwrap_or(without_prefix.len());
        let (core, qualifier) = without_prefix.split_at(core_end);

        let mut segments = Vec::new();
        let mut suffix = String::new();
        for (idx, part) in core.split('.').enumerate() {
            let digits_end = part
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(part.len());
            let digits = &part[..digits_end];
            if digits.is_empty() {
                // "1.x.3": everything from the first non-numeric segment is qualifier
                suffix = core.split('.').skip(idx).collect::<Vec<_>>().join(".");
                break;
            }
            let value = digits.parse::<u64>().map_err(|_| {
                anyhow::anyhow!(
                    "Version segment '{}' in '{}' is out of range",
                    digits,
                    trimmed
                )
            })?;
            segments.push(value);
            if digits_end < part.len() {
                // "3rc1": keep the numeric head, the rest belongs to the qualifier
                let rest: Vec<&str> = core.split('.').skip(idx + 1).collect();
                suffix = std::iter::once(&part[digits_end..])
                    .chain(rest)
                    .collect::<Vec<_>>()
                    .join(".");
                break;
            }
        }

        if segments.is_empty() {
            return Err(anyhow::anyhow!(
                "Version '{}' does not contain a numeric segment",
                trimmed
            ));
        }

        suffix.push_str(qualifier);

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
            suffix,
        })
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_newer_than(&self, other: &Version) -> bool {
        self > other
    }
}

/// True if `candidate` is strictly newer than `installed`.
pub fn is_newer(candidate: &Version, installed: &Version) -> bool {
    candidate.is_newer_than(installed)
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    // Segment-wise numeric comparison; a longer version with an equal prefix is greater.
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments.cmp(&other.segments)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
#[path = "../tests/version_tests.rs"]
mod tests;

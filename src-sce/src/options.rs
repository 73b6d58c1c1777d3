use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bit flags selecting how the complex evolution recovers from an infeasible
/// reflection or a failed contraction.
///
/// Parsed from `|` or `,` separated names, e.g. `"rnd_in_sub_complex|reflection_randomization"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SceOptions(u8);

impl SceOptions {
    pub const NONE: SceOptions = SceOptions(0x00);
    /// With [`Self::RND_IN_SUB_COMPLEX`]: replace an infeasible reflection by a
    /// random point of the sub-complex bounding box
    pub const REFLECTION_RANDOMIZATION: SceOptions = SceOptions(0x01);
    /// Recover from an infeasible reflection within the sub-complex instead of
    /// the whole complex
    pub const RND_IN_SUB_COMPLEX: SceOptions = SceOptions(0x02);
    /// After a failed contraction, draw the replacement in the bounding box of
    /// the whole complex rather than the sub-complex
    pub const RANDOM_IN_COMPLEX: SceOptions = SceOptions(0x04);

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: SceOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for SceOptions {
    type Output = SceOptions;
    fn bitor(self, rhs: SceOptions) -> SceOptions {
        SceOptions(self.0 | rhs.0)
    }
}

impl FromStr for SceOptions {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut options = SceOptions::NONE;
        for token in s.split(['|', ',']).map(|t| t.trim().to_lowercase()) {
            match token.as_str() {
                "" | "none" => {}
                "reflection_randomization" | "reflection-randomization" | "reflectionrandomization" => {
                    options = options | SceOptions::REFLECTION_RANDOMIZATION
                }
                "rnd_in_sub_complex" | "rnd-in-sub-complex" | "rndinsubcomplex" => {
                    options = options | SceOptions::RND_IN_SUB_COMPLEX
                }
                "random_in_complex" | "random-in-complex" | "randomincomplex" => {
                    options = options | SceOptions::RANDOM_IN_COMPLEX
                }
                _ => return Err(format!("unknown SCE option: {}", token)),
            }
        }
        Ok(options)
    }
}

impl TryFrom<String> for SceOptions {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for SceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(SceOptions::REFLECTION_RANDOMIZATION) {
            names.push("reflection_randomization");
        }
        if self.contains(SceOptions::RND_IN_SUB_COMPLEX) {
            names.push("rnd_in_sub_complex");
        }
        if self.contains(SceOptions::RANDOM_IN_COMPLEX) {
            names.push("random_in_complex");
        }
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

impl From<SceOptions> for String {
    fn from(o: SceOptions) -> String {
        o.to_string()
    }
}

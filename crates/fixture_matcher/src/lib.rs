/// FootySignal — Fixture Matcher
/// Normalizace jmen týmů, párování CSV řádku s live eventem, výpočet minuty.

pub mod elapsed;
pub mod matcher;
pub mod normalize;

pub use elapsed::{minutes_since, resolve_elapsed, ElapsedMinutes, MinuteSource};
pub use matcher::{EventMatcher, FixtureMatch, FixtureMatcher, MatchKind, MatcherConfig};
pub use normalize::{canonical, normalize, NormalizedName};

//! Deterministic candidate ranking.
//!
//! Once eligibility has narrowed the candidates for a slot, a ranker orders
//! them. Ranking rules are applied in sequence: the next rule is consulted
//! only when the previous one ties, and a final tie-breaker by staff id makes
//! the order total. Identical input therefore always proposes the same
//! candidate.
//!
//! # Score Convention
//! **Lower score = preferred.**

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::models::{Client, StaffMember};

/// Score returned by a ranking rule. Lower = preferred.
pub type RankScore = i64;

/// A ranking criterion over eligible candidates.
pub trait RankingRule: Send + Sync + Debug {
    /// Rule name (e.g., "focus_first").
    fn name(&self) -> &'static str;

    /// Scores a candidate for the client in `ctx`. Lower = preferred.
    fn evaluate(&self, staff: &StaffMember, ctx: &RankingContext<'_>) -> RankScore;
}

/// What the rules may look at while ranking.
#[derive(Debug, Clone)]
pub struct RankingContext<'a> {
    /// Client being covered.
    pub client: &'a Client,
    /// Clients each staff member already holds in the period.
    pub load: BTreeMap<String, usize>,
    /// Candidates that qualify through a lunch-peer listing.
    pub peers: BTreeSet<String>,
}

impl<'a> RankingContext<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            load: BTreeMap::new(),
            peers: BTreeSet::new(),
        }
    }

    pub fn with_load(mut self, load: BTreeMap<String, usize>) -> Self {
        self.load = load;
        self
    }

    pub fn with_peers(mut self, peers: BTreeSet<String>) -> Self {
        self.peers = peers;
        self
    }

    /// Clients held by a staff member.
    pub fn load_of(&self, staff_id: &str) -> usize {
        self.load.get(staff_id).copied().unwrap_or(0)
    }
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep input order.
    Stable,
    /// Lexicographic by staff id.
    #[default]
    ById,
}

/// Sequential multi-rule ranker.
///
/// # Example
/// ```
/// use u_staffing::models::{Client, StaffMember};
/// use u_staffing::resolver::ranking::{rules, CandidateRanker, RankingContext};
///
/// let client = Client::new("C1").with_focus("S2");
/// let a = StaffMember::rbt("S1");
/// let b = StaffMember::rbt("S2");
/// let ranker = CandidateRanker::new().with_rule(rules::FocusFirst);
///
/// let best = ranker.select_best(vec![&a, &b], &RankingContext::new(&client));
/// assert_eq!(best.map(|s| s.id.as_str()), Some("S2"));
/// ```
#[derive(Clone, Default)]
pub struct CandidateRanker {
    rules: Vec<Arc<dyn RankingRule>>,
    tie_breaker: TieBreaker,
}

impl CandidateRanker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule; earlier rules dominate later ones.
    pub fn with_rule<R: RankingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn with_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Substitutes: focus staff first, then id.
    pub fn subs() -> Self {
        Self::new().with_rule(rules::FocusFirst)
    }

    /// Lead RBTs: lowest level first, then lightest load, then id.
    pub fn leads() -> Self {
        Self::new()
            .with_rule(rules::LowestLeadLevel)
            .with_rule(rules::LightestLoad)
    }

    /// Lunch cover: peer listing first, focus staff next, smallest group.
    pub fn lunch() -> Self {
        Self::new()
            .with_rule(rules::PeerFirst)
            .with_rule(rules::FocusFirst)
            .with_rule(rules::LightestLoad)
    }

    /// Sorts candidates, most preferred first.
    pub fn rank<'s>(
        &self,
        mut candidates: Vec<&'s StaffMember>,
        ctx: &RankingContext<'_>,
    ) -> Vec<&'s StaffMember> {
        candidates.sort_by(|a, b| self.compare(a, b, ctx));
        candidates
    }

    /// Most preferred candidate.
    pub fn select_best<'s>(
        &self,
        candidates: Vec<&'s StaffMember>,
        ctx: &RankingContext<'_>,
    ) -> Option<&'s StaffMember> {
        self.rank(candidates, ctx).into_iter().next()
    }

    fn compare(
        &self,
        a: &StaffMember,
        b: &StaffMember,
        ctx: &RankingContext<'_>,
    ) -> std::cmp::Ordering {
        for rule in &self.rules {
            let ord = rule.evaluate(a, ctx).cmp(&rule.evaluate(b, ctx));
            if ord.is_ne() {
                return ord;
            }
        }
        match self.tie_breaker {
            TieBreaker::Stable => std::cmp::Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }
}

impl Debug for CandidateRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateRanker")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}

/// Built-in ranking rules.
pub mod rules {
    use super::{RankScore, RankingContext, RankingRule};
    use crate::models::StaffMember;

    /// The client's focus staff before anyone else.
    #[derive(Debug, Clone, Copy)]
    pub struct FocusFirst;

    impl RankingRule for FocusFirst {
        fn name(&self) -> &'static str {
            "focus_first"
        }

        fn evaluate(&self, staff: &StaffMember, ctx: &RankingContext<'_>) -> RankScore {
            if ctx.client.is_focus(&staff.id) {
                0
            } else {
                1
            }
        }
    }

    /// Lower Lead level first; non-leads last.
    #[derive(Debug, Clone, Copy)]
    pub struct LowestLeadLevel;

    impl RankingRule for LowestLeadLevel {
        fn name(&self) -> &'static str {
            "lowest_lead_level"
        }

        fn evaluate(&self, staff: &StaffMember, _ctx: &RankingContext<'_>) -> RankScore {
            staff
                .role
                .lead_level()
                .map_or(RankScore::MAX, RankScore::from)
        }
    }

    /// Fewest clients already held.
    #[derive(Debug, Clone, Copy)]
    pub struct LightestLoad;

    impl RankingRule for LightestLoad {
        fn name(&self) -> &'static str {
            "lightest_load"
        }

        fn evaluate(&self, staff: &StaffMember, ctx: &RankingContext<'_>) -> RankScore {
            ctx.load_of(&staff.id) as RankScore
        }
    }

    /// Candidates admitted through a lunch-peer listing.
    #[derive(Debug, Clone, Copy)]
    pub struct PeerFirst;

    impl RankingRule for PeerFirst {
        fn name(&self) -> &'static str {
            "peer_first"
        }

        fn evaluate(&self, staff: &StaffMember, ctx: &RankingContext<'_>) -> RankScore {
            if ctx.peers.contains(&staff.id) {
                0
            } else {
                1
            }
        }
    }
}

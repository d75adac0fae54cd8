//! Strategy catalog.
//!
//! Resilience strategies grouped by theme, plus the dedicated grounding
//! ("emotional first aid") bucket used for strongly negative entries.
//! Loaded once; analysis calls only ever read from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use super::lexicon::ThemeTag;
use super::severity::SeverityBand;

/// A recommended coping action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Stable identifier derived from the title; used for de-duplication.
    pub id: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    /// Themes this strategy is filed under. Empty for grounding strategies.
    pub themes: Vec<ThemeTag>,
    /// Restricts the strategy to one severity band when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_band: Option<SeverityBand>,
}

impl Strategy {
    pub fn new<S: Into<String>>(
        theme: Option<ThemeTag>,
        title: impl Into<String>,
        description: impl Into<String>,
        steps: impl IntoIterator<Item = S>,
    ) -> Self {
        let title = title.into();
        Self {
            id: slugify(&title),
            title,
            description: description.into(),
            steps: steps.into_iter().map(Into::into).collect(),
            themes: theme.into_iter().collect(),
            severity_band: None,
        }
    }

    pub fn with_band(mut self, band: SeverityBand) -> Self {
        self.severity_band = Some(band);
        self
    }

    /// True when the strategy has no band or its band matches.
    pub fn suits(&self, band: SeverityBand) -> bool {
        self.severity_band.map_or(true, |b| b == band)
    }
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Bucket a catalog file section maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    Theme(ThemeTag),
    Grounding,
}

impl CatalogKey {
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase().replace(['_', '-'], " ");
        match key.as_str() {
            "grounding" | "emotional first aid" | "first aid" => Some(CatalogKey::Grounding),
            _ => ThemeTag::from_name(&key).map(CatalogKey::Theme),
        }
    }
}

/// Strategy as written in a catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyRecord {
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub severity_band: Option<String>,
}

impl StrategyRecord {
    fn into_strategy(self, key: CatalogKey) -> Option<Strategy> {
        if self.title.trim().is_empty() {
            warn!("Skipping catalog strategy without a title");
            return None;
        }

        let theme = match key {
            CatalogKey::Theme(theme) => Some(theme),
            CatalogKey::Grounding => None,
        };
        let mut strategy = Strategy::new(theme, self.title.trim(), self.description, self.steps);

        if let Some(name) = self.severity_band {
            match SeverityBand::from_name(&name) {
                Some(band) => strategy.severity_band = Some(band),
                None => {
                    warn!(band = %name, strategy = %strategy.id, "Ignoring unknown severity band")
                }
            }
        }

        Some(strategy)
    }
}

/// Catalog of strategies, one bucket per theme.
#[derive(Debug, Clone, Default)]
pub struct StrategyCatalog {
    buckets: BTreeMap<ThemeTag, Vec<Strategy>>,
    grounding: Vec<Strategy>,
}

impl StrategyCatalog {
    /// A catalog with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The compiled-in catalog.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();

        for (theme, seeds) in [
            (ThemeTag::Family, FAMILY),
            (ThemeTag::Food, FOOD),
            (ThemeTag::Cultural, CULTURAL),
            (ThemeTag::Social, SOCIAL),
            (ThemeTag::Academic, ACADEMIC),
            (ThemeTag::Environment, ENVIRONMENT),
            (ThemeTag::Identity, IDENTITY),
            (ThemeTag::General, GENERAL),
        ] {
            for seed in seeds {
                catalog.push(CatalogKey::Theme(theme), seed.to_strategy(Some(theme)));
            }
        }
        for seed in GROUNDING {
            catalog.push(CatalogKey::Grounding, seed.to_strategy(None));
        }

        catalog
    }

    pub fn push(&mut self, key: CatalogKey, strategy: Strategy) {
        match key {
            CatalogKey::Theme(theme) => self.buckets.entry(theme).or_default().push(strategy),
            CatalogKey::Grounding => self.grounding.push(strategy),
        }
    }

    /// Replace one bucket with the strategies read from a catalog file.
    pub fn replace_bucket(&mut self, key: CatalogKey, records: Vec<StrategyRecord>) {
        let strategies: Vec<Strategy> = records
            .into_iter()
            .filter_map(|record| record.into_strategy(key))
            .collect();

        match key {
            CatalogKey::Theme(theme) => {
                self.buckets.insert(theme, strategies);
            }
            CatalogKey::Grounding => self.grounding = strategies,
        }
    }

    pub fn bucket(&self, theme: ThemeTag) -> &[Strategy] {
        self.buckets.get(&theme).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn grounding(&self) -> &[Strategy] {
        &self.grounding
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum::<usize>() + self.grounding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hardcoded strategies returned when the catalog cannot supply any.
pub fn default_strategies() -> Vec<Strategy> {
    vec![
        Strategy::new(
            Some(ThemeTag::General),
            "Connect with Others",
            "Reach out to fellow students or join a club to build your social connections.",
            [
                "Message one classmate or neighbour today",
                "Look up one club or society that matches an interest",
                "Say yes to the next casual invitation you receive",
            ],
        ),
        Strategy::new(
            Some(ThemeTag::General),
            "Practice Self-Care",
            "Take time each day for activities that help you relax and recharge.",
            [
                "Block 20 minutes a day for something restful",
                "Keep regular meals and a steady sleep schedule",
                "Notice what drains you and what restores you",
            ],
        ),
        Strategy::new(
            Some(ThemeTag::General),
            "Explore Your New Home",
            "Set aside time to explore your new city and discover what makes it special.",
            [
                "Pick one neighbourhood to walk through this week",
                "Find a cafe, park or library where you feel at ease",
                "Keep a short list of places you want to revisit",
            ],
        ),
    ]
}

struct Seed {
    title: &'static str,
    description: &'static str,
    steps: &'static [&'static str],
    band: Option<SeverityBand>,
}

impl Seed {
    fn to_strategy(&self, theme: Option<ThemeTag>) -> Strategy {
        let steps = self.steps.iter().copied();
        let strategy = Strategy::new(theme, self.title, self.description, steps);
        match self.band {
            Some(band) => strategy.with_band(band),
            None => strategy,
        }
    }
}

const FAMILY: &[Seed] = &[
    Seed {
        title: "Regular Communication Schedule",
        description: "Establish a regular schedule for video calls with family and friends from home, accounting for time zone differences.",
        steps: &[
            "Find two time slots per week that work in both time zones",
            "Put the calls in your calendar as recurring events",
            "Keep a running list of small things to share between calls",
        ],
        band: None,
    },
    Seed {
        title: "Digital Family Dinner",
        description: "Organize a monthly digital family dinner where you and your family prepare and eat meals together over video call.",
        steps: &[
            "Agree on a date and a dish everyone can cook",
            "Set up the call with your laptop or phone at the table",
            "Take turns sharing one highlight from the month",
        ],
        band: None,
    },
    Seed {
        title: "Memory Box Creation",
        description: "Create a physical or digital collection of photos, messages, and mementos from home to look at when feeling homesick.",
        steps: &[
            "Collect photos, letters and small objects that remind you of home",
            "Store them in one box or one folder you can reach easily",
            "Add something new every few weeks, from home or from here",
        ],
        band: None,
    },
    Seed {
        title: "Care Package Exchange",
        description: "Exchange care packages with family that include small items that remind you of home.",
        steps: &[
            "Make a short wish list of snacks or items you miss",
            "Send back something local that tells your family about your new life",
            "Open the package on a video call together",
        ],
        band: None,
    },
];

const FOOD: &[Seed] = &[
    Seed {
        title: "Cook Cultural Dishes",
        description: "Learn to cook your favourite dishes from home and share them with new friends.",
        steps: &[
            "Ask a family member for one recipe you grew up with",
            "Find the ingredients or close substitutes in local shops",
            "Invite one or two people to share the meal",
        ],
        band: None,
    },
    Seed {
        title: "Find Authentic Restaurants",
        description: "Research and visit restaurants nearby that serve authentic food from your culture.",
        steps: &[
            "Ask students from your region for recommendations",
            "Try one new place every couple of weeks",
            "Bring someone along who has never tried the cuisine",
        ],
        band: None,
    },
    Seed {
        title: "Food Exchange Club",
        description: "Create or join a food exchange where international students share dishes from their home countries.",
        steps: &[
            "Check whether a cultural or cooking club already runs one",
            "Prepare a small dish with a short story about it",
            "Swap recipes with the people you meet",
        ],
        band: None,
    },
];

const CULTURAL: &[Seed] = &[
    Seed {
        title: "Cultural Transition Workshop",
        description: "Attend a cultural transition workshop offered by student services to learn coping strategies for culture shock.",
        steps: &[
            "Look up upcoming workshops from the international student office",
            "Write down two situations that felt confusing or uncomfortable",
            "Bring those situations up during the session",
        ],
        band: None,
    },
    Seed {
        title: "Cultural Events Calendar",
        description: "Create a calendar of cultural celebrations and find ways to celebrate them in your new home.",
        steps: &[
            "List the holidays and festivals that matter to you",
            "Find local communities that celebrate them",
            "Plan at least one small celebration of your own",
        ],
        band: None,
    },
    Seed {
        title: "Share Your Culture",
        description: "Organize or join events where you share aspects of your culture with new friends and classmates.",
        steps: &[
            "Pick one tradition, song or food you enjoy explaining",
            "Offer to present it at a club meeting or dinner",
            "Ask others to share one of theirs in return",
        ],
        band: None,
    },
    Seed {
        title: "Neighbourhood Discovery Walks",
        description: "Take walks or guided tours through different neighbourhoods to understand the local culture and find places where you feel comfortable.",
        steps: &[
            "Choose one neighbourhood per week",
            "Note one custom or habit that surprised you",
            "Talk about what you noticed with a local friend",
        ],
        band: None,
    },
];

const SOCIAL: &[Seed] = &[
    Seed {
        title: "International Student Club",
        description: "Join an international student association or a club related to your interests to meet people with similar experiences.",
        steps: &[
            "Browse the list of student clubs and pick two",
            "Attend one meeting of each in the next two weeks",
            "Introduce yourself to at least one person at each",
        ],
        band: None,
    },
    Seed {
        title: "Language Exchange Program",
        description: "Join a language exchange to practise the local language while helping others learn yours.",
        steps: &[
            "Sign up for a campus or community language exchange",
            "Agree on a weekly meeting time with your partner",
            "Split each session evenly between both languages",
        ],
        band: None,
    },
    Seed {
        title: "Community Volunteering",
        description: "Volunteer for community events or organizations to meet locals and gain a sense of belonging.",
        steps: &[
            "Find one cause you care about",
            "Commit to a few hours a month",
            "Stay for a coffee after the shift",
        ],
        band: None,
    },
    Seed {
        title: "Residence Activities",
        description: "Attend activities organized by your residence or housing community to meet neighbours and build local friendships.",
        steps: &[
            "Check the residence notice board or group chat",
            "Go to one event even if you go alone",
            "Leave your door open when you are studying in your room",
        ],
        band: None,
    },
];

const ACADEMIC: &[Seed] = &[
    Seed {
        title: "Study Group Formation",
        description: "Form a study group with classmates from different backgrounds to understand material from new perspectives while building connections.",
        steps: &[
            "Ask two or three classmates after lecture",
            "Meet at a fixed time each week",
            "Rotate who explains the hardest topic",
        ],
        band: None,
    },
    Seed {
        title: "Professor Office Hours",
        description: "Regularly attend office hours to build a relationship with your professors and clarify challenging concepts.",
        steps: &[
            "Note the office hours of each course",
            "Bring one concrete question each time",
            "Follow up by email if something is still unclear",
        ],
        band: None,
    },
    Seed {
        title: "Use University Resources",
        description: "Take advantage of academic support services like tutoring, writing centres and academic advisors.",
        steps: &[
            "Find the tutoring and writing centre booking pages",
            "Book a session before your next big deadline",
            "Ask an advisor about study skills workshops",
        ],
        band: None,
    },
    Seed {
        title: "Academic Goal Setting",
        description: "Set clear, achievable academic goals and celebrate your progress to build confidence.",
        steps: &[
            "Write down one goal per course for this term",
            "Break each goal into weekly steps",
            "Reward yourself when you complete a step",
        ],
        band: None,
    },
];

const ENVIRONMENT: &[Seed] = &[
    Seed {
        title: "Create a Comfortable Space",
        description: "Make your living space comfortable and personal with items that make you feel at home.",
        steps: &[
            "Put up photos or decorations from home",
            "Add one thing that smells or sounds familiar",
            "Keep one corner tidy and calm for resting",
        ],
        band: None,
    },
    Seed {
        title: "Nature Connection",
        description: "Spend time in nature to reduce stress and build a connection to your new environment.",
        steps: &[
            "Find the nearest park, beach or trail",
            "Go for a 30-minute walk twice a week",
            "Leave your phone in your pocket for the first ten minutes",
        ],
        band: None,
    },
    Seed {
        title: "Weather Readiness",
        description: "Prepare for an unfamiliar climate so the weather becomes something you can enjoy instead of endure.",
        steps: &[
            "Ask locals what they wear in each season",
            "Get one good layer for rain or cold",
            "Plan one indoor activity you enjoy for grey days",
        ],
        band: None,
    },
];

const IDENTITY: &[Seed] = &[
    Seed {
        title: "Identity Reflection Journal",
        description: "Keep a journal about how your identity is evolving and the positive sides of integrating different cultural elements.",
        steps: &[
            "Write for ten minutes twice a week",
            "Note one part of home you want to keep and one new habit you like",
            "Re-read older entries once a month",
        ],
        band: None,
    },
    Seed {
        title: "Find Cultural Mentors",
        description: "Connect with senior students from your culture who have successfully navigated the transition.",
        steps: &[
            "Ask your cultural association about mentoring",
            "Prepare questions about their first year",
            "Meet once a month for coffee",
        ],
        band: None,
    },
    Seed {
        title: "Personal Values Clarification",
        description: "Identify which aspects of your home culture and your new culture align with your personal values.",
        steps: &[
            "List your five most important values",
            "Note where each one shows up at home and here",
            "Choose one small action per week that honours a value",
        ],
        band: None,
    },
];

const GENERAL: &[Seed] = &[
    Seed {
        title: "Daily Gratitude Practice",
        description: "Write down three things you appreciate about your new environment each day to shift focus toward positive aspects.",
        steps: &[
            "Keep a notebook or note on your phone by your bed",
            "Write three specific things each evening",
            "Review the week every Sunday",
        ],
        band: None,
    },
    Seed {
        title: "Mindfulness Meditation",
        description: "Practice mindfulness meditation to stay grounded and present during difficult moments.",
        steps: &[
            "Start with five minutes a day using a guided app",
            "Sit at the same time each day",
            "Increase to ten minutes after the first week",
        ],
        band: None,
    },
    Seed {
        title: "Physical Activity Plan",
        description: "Develop a regular physical activity routine to improve mood and energy levels.",
        steps: &[
            "Pick an activity you enjoy at the campus gym or outdoors",
            "Schedule three sessions a week",
            "Invite a friend to keep each other accountable",
        ],
        band: None,
    },
    Seed {
        title: "Sleep Hygiene Improvement",
        description: "Establish a consistent sleep schedule and bedtime routine to improve sleep quality and emotional resilience.",
        steps: &[
            "Go to bed and wake up at the same time every day",
            "Put screens away 30 minutes before sleep",
            "Keep your room dark, cool and quiet",
        ],
        band: None,
    },
    Seed {
        title: "Talk to a Counsellor",
        description: "When homesickness feels heavy, a counsellor can help you make sense of it and find a way forward.",
        steps: &[
            "Look up the counselling service at your university",
            "Book a first appointment, even if you are unsure what to say",
            "Write down how you have been feeling to bring along",
        ],
        band: Some(SeverityBand::Significant),
    },
];

const GROUNDING: &[Seed] = &[
    Seed {
        title: "Emotional First Aid",
        description: "When feeling overwhelmed, try the 5-4-3-2-1 grounding technique to bring your attention back to the present.",
        steps: &[
            "Name 5 things you can see",
            "Name 4 things you can touch",
            "Name 3 things you can hear",
            "Name 2 things you can smell",
            "Name 1 thing you can taste",
        ],
        band: None,
    },
    Seed {
        title: "Box Breathing",
        description: "Slow, counted breathing calms the body's stress response within a few minutes.",
        steps: &[
            "Breathe in for a count of four",
            "Hold for four",
            "Breathe out for four",
            "Hold for four and repeat for two minutes",
        ],
        band: None,
    },
];

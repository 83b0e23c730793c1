//! The achievement catalog: a fixed, immutable table of threshold rules.
//! The engine receives it as a value, so tests can inject their own.

/// Snapshot of the per-user metrics a rule is checked against. Always derived
/// fresh from the store at evaluation time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserMetrics {
    pub total_points: i64,
    pub streak_days: u32,
    pub co2_saved: f64,
    pub water_saved: f64,
    pub energy_saved: f64,
    pub waste_avoided: f64,
    pub entries_logged: u64,
    pub challenges_completed: u64,
    pub quiz_streak: i32,
}

/// Threshold condition of a single achievement. Kept as data rather than
/// closures so a catalog entry is printable and comparable in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    TotalPoints(i64),
    StreakDays(u32),
    Co2Saved(f64),
    WaterSaved(f64),
    EnergySaved(f64),
    WasteAvoided(f64),
    EntriesLogged(u64),
    ChallengesCompleted(u64),
    QuizStreak(i32),
}

impl Condition {
    pub fn is_met(&self, metrics: &UserMetrics) -> bool {
        match *self {
            Condition::TotalPoints(min) => metrics.total_points >= min,
            Condition::StreakDays(min) => metrics.streak_days >= min,
            Condition::Co2Saved(min) => metrics.co2_saved >= min,
            Condition::WaterSaved(min) => metrics.water_saved >= min,
            Condition::EnergySaved(min) => metrics.energy_saved >= min,
            Condition::WasteAvoided(min) => metrics.waste_avoided >= min,
            Condition::EntriesLogged(min) => metrics.entries_logged >= min,
            Condition::ChallengesCompleted(min) => metrics.challenges_completed >= min,
            Condition::QuizStreak(min) => metrics.quiz_streak >= min,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub points_bonus: i64,
    pub condition: Condition,
}

pub const DEFAULT_CATALOG: &[Achievement] = &[
    Achievement {
        id: "first_sprout",
        name: "First Sprout",
        description: "Log your first entry",
        icon: "🌱",
        points_bonus: 5,
        condition: Condition::EntriesLogged(1),
    },
    Achievement {
        id: "getting_greener",
        name: "Getting Greener",
        description: "Reach 100 points",
        icon: "🌿",
        points_bonus: 10,
        condition: Condition::TotalPoints(100),
    },
    Achievement {
        id: "eco_warrior",
        name: "Eco Warrior",
        description: "Reach 500 points",
        icon: "🛡️",
        points_bonus: 25,
        condition: Condition::TotalPoints(500),
    },
    Achievement {
        id: "planet_champion",
        name: "Planet Champion",
        description: "Reach 1000 points",
        icon: "🏆",
        points_bonus: 50,
        condition: Condition::TotalPoints(1000),
    },
    Achievement {
        id: "three_day_habit",
        name: "Three-Day Habit",
        description: "Log entries three days in a row",
        icon: "📅",
        points_bonus: 10,
        condition: Condition::StreakDays(3),
    },
    Achievement {
        id: "full_week",
        name: "Full Week",
        description: "Log entries seven days in a row",
        icon: "🔥",
        points_bonus: 20,
        condition: Condition::StreakDays(7),
    },
    Achievement {
        id: "monthly_devotion",
        name: "Monthly Devotion",
        description: "Log entries thirty days in a row",
        icon: "🌕",
        points_bonus: 75,
        condition: Condition::StreakDays(30),
    },
    Achievement {
        id: "carbon_cutter",
        name: "Carbon Cutter",
        description: "Save 50 kg of CO2",
        icon: "💨",
        points_bonus: 20,
        condition: Condition::Co2Saved(50.0),
    },
    Achievement {
        id: "water_guardian",
        name: "Water Guardian",
        description: "Save 1000 liters of water",
        icon: "💧",
        points_bonus: 20,
        condition: Condition::WaterSaved(1000.0),
    },
    Achievement {
        id: "energy_saver",
        name: "Energy Saver",
        description: "Save 100 kWh of energy",
        icon: "⚡",
        points_bonus: 20,
        condition: Condition::EnergySaved(100.0),
    },
    Achievement {
        id: "waste_watcher",
        name: "Waste Watcher",
        description: "Avoid 25 kg of waste",
        icon: "♻️",
        points_bonus: 20,
        condition: Condition::WasteAvoided(25.0),
    },
    Achievement {
        id: "challenger",
        name: "Challenger",
        description: "Complete your first challenge",
        icon: "🎯",
        points_bonus: 10,
        condition: Condition::ChallengesCompleted(1),
    },
    Achievement {
        id: "challenge_veteran",
        name: "Challenge Veteran",
        description: "Complete ten challenges",
        icon: "🎖️",
        points_bonus: 30,
        condition: Condition::ChallengesCompleted(10),
    },
    Achievement {
        id: "quiz_master",
        name: "Quiz Master",
        description: "Answer five quiz questions correctly in a row",
        icon: "🧠",
        points_bonus: 15,
        // Streak-based proxy for a perfect quiz score, carried over from the
        // original scoring rules.
        condition: Condition::QuizStreak(5),
    },
    Achievement {
        id: "steady_logger",
        name: "Steady Logger",
        description: "Log thirty entries",
        icon: "📝",
        points_bonus: 25,
        condition: Condition::EntriesLogged(30),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<&str> = DEFAULT_CATALOG.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DEFAULT_CATALOG.len());
    }

    #[test]
    fn thresholds_gate_on_the_right_metric() {
        let metrics = UserMetrics {
            total_points: 120,
            streak_days: 3,
            quiz_streak: 4,
            ..Default::default()
        };
        assert!(Condition::TotalPoints(100).is_met(&metrics));
        assert!(!Condition::TotalPoints(500).is_met(&metrics));
        assert!(Condition::StreakDays(3).is_met(&metrics));
        assert!(!Condition::QuizStreak(5).is_met(&metrics));
        assert!(!Condition::Co2Saved(50.0).is_met(&metrics));
    }
}

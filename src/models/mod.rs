use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One distinct food recognised in a meal description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub estimated_calories: f64,  // kcal for the described portion
    pub estimated_protein: f64,   // grams
    pub assumed_weight_g: f64,    // portion mass the estimate is based on (0 = unknown)
    pub notes: String,
}

/// Totals over one parsed meal, as shown to the user after analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSummary {
    pub item_count: usize,
    pub total_calories: f64,
    pub total_protein: f64,
}

impl MealSummary {
    pub fn from_items(items: &[FoodItem]) -> Self {
        Self {
            item_count: items.len(),
            total_calories: items.iter().map(|f| f.estimated_calories).sum(),
            total_protein: items.iter().map(|f| f.estimated_protein).sum(),
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "We found {} item{} totaling ~{} calories and {}g of protein",
            self.item_count,
            if self.item_count == 1 { "" } else { "s" },
            format_amount(self.total_calories),
            format_amount(self.total_protein),
        )
    }
}

/// Shape of a row in the `food_log` table. The table lives in the hosted
/// store; this crate only produces values a caller may persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl LogEntry {
    pub fn from_food_item(item: &FoodItem, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: item.name.clone(),
            calories: item.estimated_calories,
            protein: item.estimated_protein,
            timestamp,
            is_favorite: false,
        }
    }
}

/// One-row-per-user daily targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub daily_calories_goal: f64,
    pub daily_protein_goal: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            daily_calories_goal: 1800.0,
            daily_protein_goal: 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub total_calories: f64,
    pub total_protein: f64,
    pub calories_remaining: f64,
    pub protein_remaining: f64,
    pub calorie_progress_pct: f64,  // capped at 100
    pub protein_progress_pct: f64,  // capped at 100
}

impl DailyProgress {
    /// Totals for one UTC calendar day. Favorite entries are excluded.
    pub fn compute(entries: &[LogEntry], goals: &Goals, day: NaiveDate) -> Self {
        let eaten = entries
            .iter()
            .filter(|e| !e.is_favorite && e.timestamp.date_naive() == day);
        let (total_calories, total_protein) = eaten
            .fold((0.0, 0.0), |(cal, prot), e| (cal + e.calories, prot + e.protein));

        Self {
            total_calories,
            total_protein,
            calories_remaining: (goals.daily_calories_goal - total_calories).max(0.0),
            protein_remaining: (goals.daily_protein_goal - total_protein).max(0.0),
            calorie_progress_pct: progress_pct(total_calories, goals.daily_calories_goal),
            protein_progress_pct: progress_pct(total_protein, goals.daily_protein_goal),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodFrequency {
    pub name: String,
    pub count: usize,
    pub calories: f64,  // summed over every occurrence
    pub protein: f64,
}

pub const DEFAULT_TOP_FOODS: usize = 10;

/// Rank logged foods by how often they were eaten. Names are matched
/// case-insensitively; the first spelling seen is the one reported.
pub fn top_frequent_foods(entries: &[LogEntry], limit: usize) -> Vec<FoodFrequency> {
    let mut ranked: Vec<(String, FoodFrequency)> = Vec::new();

    for entry in entries.iter().filter(|e| !e.is_favorite) {
        let key = entry.name.to_lowercase();
        match ranked.iter_mut().find(|(k, _)| *k == key) {
            Some((_, freq)) => {
                freq.count += 1;
                freq.calories += entry.calories;
                freq.protein += entry.protein;
            }
            None => ranked.push((
                key,
                FoodFrequency {
                    name: entry.name.clone(),
                    count: 1,
                    calories: entry.calories,
                    protein: entry.protein,
                },
            )),
        }
    }

    // stable sort keeps first-seen order among ties
    ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    ranked.into_iter().take(limit).map(|(_, f)| f).collect()
}

fn progress_pct(total: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    (total / goal * 100.0).min(100.0)
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

//! Built-in monster templates
//!
//! A small starter set so encounters can be assembled without loading
//! campaign content. Lookups are case-insensitive.

use std::collections::BTreeMap;

use super::{ChallengeRating, MonsterTemplate};

/// Collection of monster templates keyed by lowercase name
#[derive(Debug, Clone, Default)]
pub struct Bestiary {
    templates: BTreeMap<String, MonsterTemplate>,
}

impl Bestiary {
    /// Create an empty bestiary
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in starter monsters
    pub fn standard() -> Self {
        let mut bestiary = Self::new();
        for (name, hp, hit_dice, ac, attack, damage, init, cr) in [
            ("Rat", 1, "1d4-1", 10, 0, "1d1", 0, ChallengeRating::Zero),
            ("Kobold", 5, "2d6-2", 12, 4, "1d4+2", 2, ChallengeRating::Eighth),
            ("Goblin", 7, "2d6", 15, 4, "1d6+2", 2, ChallengeRating::Quarter),
            ("Skeleton", 13, "2d8+4", 13, 4, "1d6+2", 2, ChallengeRating::Quarter),
            ("Wolf", 11, "2d8+2", 13, 4, "2d4+2", 2, ChallengeRating::Quarter),
            ("Orc", 15, "2d8+6", 13, 5, "1d12+3", 1, ChallengeRating::Half),
            ("Bugbear", 27, "5d8+5", 16, 4, "2d8+2", 2, ChallengeRating::Whole(1)),
            ("Ogre", 59, "7d10+21", 11, 6, "2d8+4", -1, ChallengeRating::Whole(2)),
        ] {
            bestiary.insert(MonsterTemplate {
                name: name.to_string(),
                hit_points: hp,
                hit_dice: Some(hit_dice.to_string()),
                armor_class: ac,
                attack_bonus: attack,
                damage: damage.to_string(),
                initiative_modifier: init,
                challenge_rating: cr,
            });
        }
        bestiary
    }

    /// Add or replace a template
    pub fn insert(&mut self, template: MonsterTemplate) {
        self.templates.insert(template.name.to_lowercase(), template);
    }

    /// Look up a template by name
    pub fn get(&self, name: &str) -> Option<&MonsterTemplate> {
        self.templates.get(&name.trim().to_lowercase())
    }

    /// Names of all templates, alphabetical
    pub fn names(&self) -> Vec<&str> {
        self.templates.values().map(|t| t.name.as_str()).collect()
    }

    /// Number of templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether there are no templates
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::parse_dice;

    #[test]
    fn test_standard_lookup() {
        let bestiary = Bestiary::standard();
        assert_eq!(bestiary.get("goblin").unwrap().name, "Goblin");
        assert_eq!(bestiary.get(" ORC ").unwrap().armor_class, 13);
        assert!(bestiary.get("dragon").is_none());
        assert_eq!(bestiary.names().len(), bestiary.len());
    }

    #[test]
    fn test_standard_formulas_parse() {
        let bestiary = Bestiary::standard();
        for name in bestiary.names() {
            let template = bestiary.get(name).unwrap();
            assert!(parse_dice(&template.damage).is_ok(), "{} damage", name);
            if let Some(hit_dice) = &template.hit_dice {
                assert!(parse_dice(hit_dice).is_ok(), "{} hit dice", name);
            }
        }
    }
}

use buildspawn_core::building::{Entrance, SpawnableBuilding};
use buildspawn_core::rule::{EnsureBoundsMode, PositionType, SpawnRule};
use buildspawn_core::types::BlockBox;
use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::validator::ValidationError;

/// One placement rule as the remote catalog sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSpawnRule {
    #[serde(default)]
    pub biomes: Vec<String>,
    pub chance: f64,
    pub position_type: PositionType,
    pub y_min: i32,
    pub y_max: i32,
    #[serde(default)]
    pub margin: Option<i32>,
    #[serde(default)]
    pub ensure_bounds: EnsureBoundsMode,
}

impl RemoteSpawnRule {
    pub fn to_rule(&self, default_margin: i32) -> SpawnRule {
        SpawnRule {
            biomes: self.biomes.clone(),
            chance: self.chance,
            position_type: self.position_type,
            y_min: self.y_min,
            y_max: self.y_max,
            margin: self.margin.unwrap_or(default_margin),
            ensure_bounds: self.ensure_bounds,
        }
    }
}

/// A catalog entry in the remote JSON format.
///
/// Corners and entrance are in the author's capture coordinates; conversion
/// normalizes them so the building starts at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBuildingEntry {
    pub rdns: String,
    pub pk: i64,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub name: HashMap<String, String>,
    #[serde(default)]
    pub description: HashMap<String, String>,
    pub min_corner: [i32; 3],
    pub max_corner: [i32; 3],
    pub entrance: [i32; 3],
    #[serde(default)]
    pub entrance_yaw: f32,
    #[serde(default)]
    pub x_world: u32,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub rules: Vec<RemoteSpawnRule>,
}

impl RemoteBuildingEntry {
    /// Capture box, ordered.
    pub fn capture_bounds(&self) -> BlockBox {
        BlockBox::from_corners(
            IVec3::from_array(self.min_corner),
            IVec3::from_array(self.max_corner),
        )
    }

    /// Normalize into a spawnable building, validating geometry and rules.
    pub fn to_building(&self, default_margin: i32) -> Result<SpawnableBuilding, ValidationError> {
        if self.rdns.trim().is_empty() {
            return Err(ValidationError::EmptyRdns { pk: self.pk });
        }
        let capture = self.capture_bounds();
        let entrance = Entrance {
            pos: IVec3::from_array(self.entrance) - capture.min,
            yaw: self.entrance_yaw.rem_euclid(360.0),
        };

        let mut building =
            SpawnableBuilding::new(self.rdns.clone(), self.pk, capture.size(), entrance)
                .with_author(&self.author)
                .with_cap(self.x_world)
                .with_hash(&self.hash);
        building.names = self.name.clone();
        building.descriptions = self.description.clone();

        building
            .check_geometry()
            .map_err(|source| ValidationError::Geometry {
                rdns: self.rdns.clone(),
                source,
            })?;

        for (index, remote) in self.rules.iter().enumerate() {
            let rule = remote.to_rule(default_margin);
            rule.validate().map_err(|source| ValidationError::Rule {
                rdns: self.rdns.clone(),
                index,
                source,
            })?;
            building.rules.push(rule);
        }
        Ok(building)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> RemoteBuildingEntry {
        RemoteBuildingEntry {
            rdns: "com.example.hut".into(),
            pk: 3,
            author: "alex".into(),
            name: HashMap::from([("en_us".to_string(), "Hut".to_string())]),
            description: HashMap::new(),
            min_corner: [110, 70, -4],
            max_corner: [100, 64, -10],
            entrance: [105, 65, -10],
            entrance_yaw: -90.0,
            x_world: 2,
            hash: "abc".into(),
            rules: vec![RemoteSpawnRule {
                biomes: vec!["plains".into()],
                chance: 0.5,
                position_type: PositionType::OnGround,
                y_min: 50,
                y_max: 120,
                margin: None,
                ensure_bounds: EnsureBoundsMode::AboveEntrance,
            }],
        }
    }

    #[test]
    fn test_normalizes_size_and_entrance() {
        let b = entry().to_building(5).expect("valid");
        assert_eq!(b.size, IVec3::new(11, 7, 7));
        assert_eq!(b.entrance.pos, IVec3::new(5, 1, 0));
        assert_eq!(b.entrance.yaw, 270.0);
        assert_eq!(b.x_world, 2);
        assert_eq!(b.display_name("en_us"), "Hut");
    }

    #[test]
    fn test_rule_margin_defaulted() {
        let b = entry().to_building(7).expect("valid");
        assert_eq!(b.rules[0].margin, 7);
        assert_eq!(b.rules[0].ensure_bounds, EnsureBoundsMode::AboveEntrance);
    }

    #[test]
    fn test_entrance_outside_rejected() {
        let mut e = entry();
        e.entrance = [0, 0, 0];
        assert!(matches!(
            e.to_building(5),
            Err(ValidationError::Geometry { .. })
        ));
    }

    #[test]
    fn test_bad_rule_rejected() {
        let mut e = entry();
        e.rules[0].chance = 2.0;
        assert!(matches!(
            e.to_building(5),
            Err(ValidationError::Rule { index: 0, .. })
        ));
    }

    #[test]
    fn test_camel_case_json() {
        let json = r#"{
            "rdns": "com.example.well",
            "pk": 9,
            "minCorner": [0, 0, 0],
            "maxCorner": [2, 3, 2],
            "entrance": [1, 0, 0],
            "entranceYaw": 180.0,
            "xWorld": 1,
            "rules": [{"chance": 1.0, "positionType": "BOTTOM_WATER", "yMin": -20, "yMax": 40}]
        }"#;
        let e: RemoteBuildingEntry = serde_json::from_str(json).expect("parse");
        assert_eq!(e.x_world, 1);
        assert_eq!(e.rules[0].position_type, PositionType::BottomWater);
        let b = e.to_building(5).expect("valid");
        assert_eq!(b.size, IVec3::new(3, 4, 3));
    }
}

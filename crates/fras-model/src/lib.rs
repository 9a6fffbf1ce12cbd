pub mod feature;
pub mod geometry;
pub mod schema;
pub mod value;

pub use feature::{Feature, FeatureCollection, Record};
pub use geometry::{Envelope, Geometry, GeometryError, SpatialRef};
pub use schema::{FieldDef, RESERVED_FIELDS, Schema, is_reserved_field};
pub use value::{FieldType, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_round_trips_through_json() {
        let schema: Schema = [
            FieldDef::new("Source", FieldType::Text),
            FieldDef::new("Burn_Date", FieldType::Long),
        ]
        .into_iter()
        .collect();
        let mut collection = FeatureCollection::new(schema, SpatialRef::VICGRID94);
        collection.push(
            Feature::new(Geometry::from_extent(0.0, 0.0, 2.0, 2.0).unwrap())
                .with("Source", "NSW")
                .with("Burn_Date", 20230405i64),
        );

        let json = serde_json::to_string(&collection).expect("serialize collection");
        let round: FeatureCollection = serde_json::from_str(&json).expect("deserialize collection");
        assert_eq!(round, collection);
        assert_eq!(round.record(0).unwrap().long("BURN_DATE"), Some(20230405));
    }
}

//! Cross-module tests for cepmatch.
//!
//! These tests check the overlap and containment laws end to end, from
//! loaded records through the matchers to the written output.

use ahash::AHashSet;
use std::io::BufReader;

use cepmatch::config::{Config, CITY_FILTER_KEY, STATE_FILTER_KEY};
use cepmatch::matcher::overlap::{
    match_candidates, match_candidates_indexed, overlaps_any, ranges_overlap, ReferenceIndex,
};
use cepmatch::matcher::region::{
    export_regions, haversine_distance_m, points_in_region,
};
use cepmatch::matcher::FilterSelection;
use cepmatch::output::{write_candidates, write_exported_rows, UTF8_BOM};
use cepmatch::parser::points::parse_points_reader;
use cepmatch::parser::ranges::parse_ranges_reader;
use cepmatch::parser::regions::parse_regions_reader;
use cepmatch::session::DrawingSession;
use cepmatch::types::{Attributes, Candidate, Point, Range, Region};

// -------------------------------------------------------------------------
// Helper functions
// -------------------------------------------------------------------------

fn candidate(start: i64, end: i64) -> Candidate {
    Candidate::new(Range::new(start, end), Attributes::new())
}

fn point(lat: f64, lon: f64, name: &str) -> Point {
    let mut attributes = Attributes::new();
    attributes.insert("nome".to_string(), name.to_string());
    attributes.insert(STATE_FILTER_KEY.to_string(), "DF".to_string());
    attributes.insert(CITY_FILTER_KEY.to_string(), "Brasília".to_string());
    Point::new(lat, lon, attributes)
}

fn square(color: &str, min_lon: f64, min_lat: f64, size: f64) -> Region {
    Region::polygon(
        color,
        vec![
            (min_lon, min_lat),
            (min_lon + size, min_lat),
            (min_lon + size, min_lat + size),
            (min_lon, min_lat + size),
            (min_lon, min_lat),
        ],
    )
}

fn default_excluded() -> AHashSet<String> {
    Config::default().excluded_attributes
}

// -------------------------------------------------------------------------
// 1. Range overlap laws
// -------------------------------------------------------------------------

mod test_range_overlap {
    use super::*;

    #[test]
    fn test_symmetry() {
        let ranges = [
            Range::new(1, 10),
            Range::new(10, 20),
            Range::new(11, 20),
            Range::new(5, 5),
            Range::new(-3, 2),
            Range::new(30, 25),
        ];
        for a in &ranges {
            for b in &ranges {
                assert_eq!(ranges_overlap(a, b), ranges_overlap(b, a), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_reflexivity() {
        for r in [Range::new(1, 10), Range::new(0, 0), Range::new(70000000, 70999999)] {
            assert!(ranges_overlap(&r, &r));
        }
    }

    #[test]
    fn test_touching_endpoints() {
        assert!(ranges_overlap(&Range::new(1, 10), &Range::new(10, 20)));
    }

    #[test]
    fn test_adjacent_but_disjoint() {
        assert!(!ranges_overlap(&Range::new(1, 10), &Range::new(11, 20)));
    }

    #[test]
    fn test_empty_reference_all_false() {
        let result = match_candidates(&[candidate(1, 10)], &[]);
        assert_eq!(result.len(), 1);
        assert!(!result[0].belongs);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let reference = [Range::new(1000, 1999), Range::new(5000, 5999)];
        let cands = vec![candidate(1500, 1600), candidate(2000, 2100), candidate(5999, 6000)];

        let linear: Vec<bool> = match_candidates(&cands, &reference)
            .iter()
            .map(|c| c.belongs)
            .collect();
        let indexed: Vec<bool> = match_candidates_indexed(&cands, &ReferenceIndex::new(&reference))
            .iter()
            .map(|c| c.belongs)
            .collect();

        assert_eq!(linear, vec![true, false, true]);
        assert_eq!(indexed, linear);
    }

    #[test]
    fn test_input_candidates_untouched() {
        let cands = vec![candidate(1, 1)];
        let _ = match_candidates(&cands, &[Range::new(0, 5)]);
        assert!(!cands[0].belongs);
    }

    #[test]
    fn test_index_agrees_with_scan_on_pseudo_random_data() {
        // Deterministic LCG so the test is reproducible
        let mut state: u64 = 42;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 1000) as i64
        };

        let reference: Vec<Range> = (0..50).map(|_| Range::new(next(), next())).collect();
        let index = ReferenceIndex::new(&reference);

        for _ in 0..2000 {
            let q = Range::new(next(), next());
            assert_eq!(index.overlaps(&q), overlaps_any(&q, &reference), "query {}", q);
        }
    }
}

// -------------------------------------------------------------------------
// 2. Region containment laws
// -------------------------------------------------------------------------

mod test_region_containment {
    use super::*;

    #[test]
    fn test_circle_boundary_inclusive() {
        let (lat, lon) = (-23.5505, -46.6333);
        let p = point(-23.5600, -46.6400, "edge");
        let radius = haversine_distance_m(lat, lon, p.lat, p.lon);

        assert!(Region::circle("#ff0000", lat, lon, radius).contains(&p));
    }

    #[test]
    fn test_circle_radius_in_meters() {
        // 0.01 degrees of latitude is about 1112 m
        let p = point(0.01, 0.0, "north");
        assert!(Region::circle("#ff0000", 0.0, 0.0, 1_200.0).contains(&p));
        assert!(!Region::circle("#ff0000", 0.0, 0.0, 1_000.0).contains(&p));
    }

    #[test]
    fn test_polygon_centroid_and_far_point() {
        let region = square("#00ff00", -48.0, -16.0, 0.5);
        assert!(region.contains(&point(-15.75, -47.75, "centroid")));
        assert!(!region.contains(&point(40.0, 100.0, "far")));
    }

    #[test]
    fn test_unclosed_ring_still_matches() {
        // Ring as a drawing tool might emit it, without the closing position
        let region = Region::polygon("#000000", vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        assert!(region.contains(&point(1.0, 1.0, "inside")));
    }

    #[test]
    fn test_duplication_law() {
        let regions = vec![
            square("#ff0000", 0.0, 0.0, 2.0),
            square("#00ff00", 1.0, 1.0, 2.0),
        ];
        let points = vec![point(1.5, 1.5, "shared"), point(0.5, 0.5, "red only")];

        let rows = export_regions(&regions, &points, &default_excluded());
        let shared: Vec<&str> = rows
            .iter()
            .filter(|r| r.attributes["nome"] == "shared")
            .map(|r| r.region_color.as_str())
            .collect();
        assert_eq!(shared, vec!["#ff0000", "#00ff00"]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_attribute_exclusion() {
        let regions = vec![square("#ff0000", 0.0, 0.0, 1.0)];
        let points = vec![point(0.5, 0.5, "a"), point(0.6, 0.6, "b")];

        let excluded: AHashSet<String> = ["estado_filtro", "cidade_filtro"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = export_regions(&regions, &points, &excluded);

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert!(!row.attributes.contains_key("estado_filtro"));
            assert!(!row.attributes.contains_key("cidade_filtro"));
        }
    }

    #[test]
    fn test_region_without_points_contributes_nothing() {
        let regions = vec![square("#ff0000", 50.0, 50.0, 1.0)];
        let points = vec![point(0.5, 0.5, "a")];
        assert!(points_in_region(&regions[0], &points).is_empty());
        assert!(export_regions(&regions, &points, &default_excluded()).is_empty());
    }
}

// -------------------------------------------------------------------------
// 3. Loaders through matchers to writers
// -------------------------------------------------------------------------

mod test_pipeline {
    use super::*;

    #[test]
    fn test_ranges_pipeline() {
        let config = Config::default();
        let base = parse_ranges_reader(
            BufReader::new("CEP inicial,CEP final\n1000,1999\n5000,5999\n".as_bytes()),
            &config,
        )
        .unwrap();
        let streets = parse_ranges_reader(
            BufReader::new(
                "logradouro,CEP inicial,CEP final\nRua A,1500,1600\nRua B,2000,2100\nRua C,5999,6000\n"
                    .as_bytes(),
            ),
            &config,
        )
        .unwrap();

        let matched =
            match_candidates_indexed(&streets.candidates, &ReferenceIndex::new(&base.ranges()));

        let mut output = Vec::new();
        write_candidates(&mut output, &streets.headers, &matched, &config).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "logradouro,CEP inicial,CEP final,belongs\n\
             Rua A,1500,1600,true\n\
             Rua B,2000,2100,false\n\
             Rua C,5999,6000,true\n"
        );
    }

    #[test]
    fn test_regions_pipeline() {
        let config = Config::default();
        let points = parse_points_reader(
            BufReader::new(
                "bairro,latitude,longitude,UF,cidade\n\
                 A,0.5,0.5,DF,Brasília\n\
                 B,1.5,1.5,DF,Brasília\n\
                 C,0.5,0.5,GO,Goiânia\n\
                 D,,0.5,DF,Brasília\n"
                    .as_bytes(),
            ),
            &config,
        )
        .unwrap();
        assert_eq!(points.points.len(), 3);
        assert_eq!(points.dropped, 1);

        let mut session = DrawingSession::new(config.default_region_color.clone());
        let json = r##"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"color": "#ff0000"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}},
            {"type": "Feature", "properties": {"radius": 1000},
             "geometry": {"type": "Point", "coordinates": [0.5, 0.5]}}
        ]}"##;
        parse_regions_reader(json.as_bytes(), &mut session).unwrap();

        let selection = FilterSelection::from_lists(Some(vec!["DF".to_string()]), None);
        let rows = session
            .export(&points.points, &selection, &config.excluded_attributes)
            .unwrap();

        let mut output = Vec::new();
        write_exported_rows(&mut output, &rows, &config).unwrap();
        assert!(output.starts_with(UTF8_BOM));
        let text = String::from_utf8(output[UTF8_BOM.len()..].to_vec()).unwrap();

        assert_eq!(
            text,
            "bairro;latitude;longitude;COR_POLIGONO\n\
             \"A\";\"0.5\";\"0.5\";\"#ff0000\"\n\
             \"B\";\"1.5\";\"1.5\";\"#ff0000\"\n\
             \"A\";\"0.5\";\"0.5\";\"#3388ff\"\n"
        );
    }
}

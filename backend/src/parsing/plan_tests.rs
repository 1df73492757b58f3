#[cfg(test)]
mod tests {
    use crate::models::{ObsConditions, Program, TileId};
    use crate::parsing::plan::{parse_plan, parse_plan_csv_str, parse_plan_json_str};
    use std::io::Write;
    use tempfile::Builder;

    const PLAN_CSV: &str = "\
# MOONFRAC = 0.42
TILEID,RA,DEC,PASS,PROGRAM,LSTMIN,LSTMAX,EXPLEN,EBV_MED,STATUS,OBSCONDITIONS
1001,150.0,2.5,0,DARK,9.5,11.0,1000.0,0.021,0,1
1002,151.5,2.5,0,GRAY,23.5,0.5,900.0,0.030,0,2
";

    /// Test CSV plans: hour-to-degree conversion and row order
    #[test]
    fn test_parse_plan_csv() {
        let plan = parse_plan_csv_str(PLAN_CSV).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.moon_illumination_fraction, 0.42);

        let first = &plan.tiles[0];
        assert_eq!(first.tile_id, TileId(1001));
        assert_eq!(first.program, Program::Dark);
        assert_eq!(first.lst_min.value(), 142.5);
        assert_eq!(first.lst_max.value(), 165.0);
        assert_eq!(first.expected_exposure_length.value(), 1000.0);
        assert_eq!(first.extinction, 0.021);
        assert_eq!(first.obs_conditions, ObsConditions::DARK);
        assert_eq!(first.priority, None);

        // Windows crossing 24h are kept as given
        let second = &plan.tiles[1];
        assert_eq!(second.lst_min.value(), 352.5);
        assert_eq!(second.lst_max.value(), 7.5);
    }

    #[test]
    fn test_parse_plan_csv_optional_columns() {
        let csv = "\
# MOONFRAC = 0.1
TILEID,RA,DEC,PASS,PROGRAM,LSTMIN,LSTMAX,EXPLEN,EBV_MED,STATUS,OBSCONDITIONS,PRIORITY,LSTASSIGNED
5,10.0,0.0,1,BRIGHT,1.0,2.0,300.0,0.01,1,4,7.5,1.5
6,12.0,0.0,1,BRIGHT,1.0,2.0,300.0,0.01,1,4,,
";
        let plan = parse_plan_csv_str(csv).unwrap();
        assert_eq!(plan.tiles[0].priority, Some(7.5));
        assert_eq!(plan.tiles[0].lst_assigned, Some(22.5));
        assert_eq!(plan.tiles[1].priority, None);
        assert_eq!(plan.tiles[1].lst_assigned, None);
    }

    #[test]
    fn test_missing_moonfrac_defaults_to_zero() {
        let csv = PLAN_CSV.lines().skip(1).collect::<Vec<_>>().join("\n");
        let plan = parse_plan_csv_str(&csv).unwrap();
        assert_eq!(plan.moon_illumination_fraction, 0.0);
    }

    #[test]
    fn test_invalid_program_names_row() {
        let csv = PLAN_CSV.replace("GRAY", "TWILIGHT");
        let err = parse_plan_csv_str(&csv).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("row 2"), "{}", message);
        assert!(message.contains("TWILIGHT"), "{}", message);
    }

    #[test]
    fn test_non_positive_exposure_rejected() {
        let csv = PLAN_CSV.replace("1000.0", "0.0");
        assert!(parse_plan_csv_str(&csv).is_err());
    }

    #[test]
    fn test_non_positive_tile_id_names_row() {
        let csv = PLAN_CSV.replace("1002,", "0,");
        let message = format!("{:#}", parse_plan_csv_str(&csv).unwrap_err());
        assert!(message.contains("row 2"), "{}", message);
        assert!(message.contains("TILEID"), "{}", message);

        let csv = PLAN_CSV.replace("1001,", "-1001,");
        assert!(parse_plan_csv_str(&csv).is_err());
    }

    #[test]
    fn test_moonfrac_out_of_range() {
        let csv = PLAN_CSV.replace("0.42", "1.5");
        assert!(parse_plan_csv_str(&csv).is_err());
    }

    #[test]
    fn test_parse_plan_json() {
        let json = r#"{
            "moon_frac": 0.75,
            "tiles": [
                {
                    "TILEID": 77, "RA": 30.0, "DEC": -10.0, "PASS": 2,
                    "PROGRAM": "BRIGHT", "LSTMIN": 2.0, "LSTMAX": 3.0,
                    "EXPLEN": 600.0, "EBV_MED": 0.05, "STATUS": 0,
                    "OBSCONDITIONS": 4, "PRIORITY": 3.0
                }
            ]
        }"#;
        let plan = parse_plan_json_str(json).unwrap();

        assert_eq!(plan.moon_illumination_fraction, 0.75);
        assert_eq!(plan.tiles[0].tile_id, TileId(77));
        assert_eq!(plan.tiles[0].lst_min.value(), 30.0);
        assert_eq!(plan.tiles[0].lst_max.value(), 45.0);
        assert_eq!(plan.tiles[0].priority, Some(3.0));
        assert!(plan.tiles[0].obs_conditions.allows_bright());
    }

    /// Test that JSON errors report the failing path
    #[test]
    fn test_parse_plan_json_error_path() {
        let json = r#"{"moon_frac": 0.1, "tiles": [{"TILEID": "abc"}]}"#;
        let err = parse_plan_json_str(json).unwrap_err();
        assert!(err.to_string().contains("tiles[0].TILEID"), "{}", err);
    }

    #[test]
    fn test_parse_plan_dispatches_on_extension() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(PLAN_CSV.as_bytes()).unwrap();
        file.flush().unwrap();
        assert_eq!(parse_plan(file.path()).unwrap().len(), 2);

        let other = Builder::new().suffix(".fits").tempfile().unwrap();
        assert!(parse_plan(other.path()).is_err());
    }
}

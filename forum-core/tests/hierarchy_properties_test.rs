//! Properties of the organization structure that callers rely on

use forum_core::{
    Catalog, Error, OccupancyPolicy, OrganizationStructure, Position, UserId, Year,
    MAX_REPS_PER_YEAR,
};

const POLICY: OccupancyPolicy = OccupancyPolicy::Permissive;

fn seeded() -> (Catalog, OrganizationStructure) {
    let catalog = Catalog::builtin().unwrap();
    let structure = OrganizationStructure::seeded(&catalog, &UserId::from("U1"));
    (catalog, structure)
}

/// Every bucket of every school starts with full capacity
#[test]
fn test_fresh_structure_reports_full_capacity_everywhere() {
    let (catalog, structure) = seeded();

    for school in catalog.schools() {
        let openings = structure.rep_openings(&catalog, &school.id);
        assert_eq!(openings.len(), school.tracks.len() * 3);
        for opening in openings {
            assert_eq!(opening.available, MAX_REPS_PER_YEAR);
        }
    }

    let seats = structure.coordinator_openings(&catalog);
    assert_eq!(seats.len(), catalog.schools().len());
    assert!(seats.iter().all(|s| !s.is_occupied));
}

/// Two reps fit in insertion order, the third is refused
#[test]
fn test_two_reps_then_capacity_exceeded() {
    let (catalog, mut structure) = seeded();

    for school in catalog.schools() {
        for (track_id, _) in school.tracks() {
            for year in Year::ALL {
                structure
                    .add_rep(&school.id, &track_id, year, &"A".into(), POLICY)
                    .unwrap();
                structure
                    .add_rep(&school.id, &track_id, year, &"B".into(), POLICY)
                    .unwrap();

                let result = structure.add_rep(&school.id, &track_id, year, &"C".into(), POLICY);
                assert!(matches!(result, Err(Error::CapacityExceeded { .. })));

                let reps = structure.reps(&school.id, &track_id, year).unwrap();
                assert_eq!(reps, &[UserId::from("A"), UserId::from("B")]);
            }
        }
    }
}

#[test]
fn test_removing_absent_rep_is_a_no_op() {
    let (_, mut structure) = seeded();
    structure
        .add_rep("cs", "cs-track-0", Year::FIRST, &"A".into(), POLICY)
        .unwrap();

    let changed = structure
        .remove_rep("cs", "cs-track-0", Year::FIRST, &"Z".into())
        .unwrap();

    assert!(!changed);
    assert_eq!(
        structure.reps("cs", "cs-track-0", Year::FIRST).unwrap(),
        &[UserId::from("A")]
    );
}

#[test]
fn test_remove_rep_drops_every_occurrence() {
    let (_, mut structure) = seeded();
    let dup = UserId::from("dup");
    structure.add_rep("cs", "cs-track-0", Year::FIRST, &dup, POLICY).unwrap();
    structure.add_rep("cs", "cs-track-0", Year::FIRST, &dup, POLICY).unwrap();

    assert!(structure.remove_rep("cs", "cs-track-0", Year::FIRST, &dup).unwrap());
    assert!(structure.reps("cs", "cs-track-0", Year::FIRST).unwrap().is_empty());
}

#[test]
fn test_coordinator_lookup_after_assignment() {
    let (_, mut structure) = seeded();
    let u = UserId::from("U2");
    structure.assign_coordinator("cs", Some(u.clone()), POLICY).unwrap();

    assert_eq!(
        structure.first_position(&u),
        Some(Position::Coordinator {
            school_id: "cs".to_string()
        })
    );
    assert_eq!(structure.coordinated_school(&u).unwrap().school_id(), "cs");
}

/// The all-positions scan finds every seat, the first-match lookup only one
#[test]
fn test_head_who_also_coordinates_the_same_school() {
    let (_, mut structure) = seeded();
    let head = UserId::from("U1");
    structure.assign_coordinator("cs", Some(head.clone()), POLICY).unwrap();

    let all: Vec<Position> = structure.positions(&head).collect();
    assert_eq!(
        all,
        vec![
            Position::Head,
            Position::Coordinator {
                school_id: "cs".to_string()
            }
        ]
    );
    assert_eq!(structure.first_position(&head), Some(Position::Head));
}

#[test]
fn test_unknown_user_has_no_position() {
    let (_, structure) = seeded();
    assert_eq!(structure.first_position(&"ghost".into()), None);
    assert_eq!(structure.positions(&"ghost".into()).count(), 0);
}

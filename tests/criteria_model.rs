use gradesheet::{
    criteria::{
        Aggregate, Detail, Instance, Section, SectionId, Sheet, SheetType, Subsection,
        SubsectionId, Total, aggregate,
    },
    error::CriteriaError,
};

fn sub(name: &str, order: i32, out_of: Option<f64>, earned: f64) -> Subsection {
    Subsection::builder()
        .name(name)
        .order(order)
        .maybe_out_of(out_of)
        .earned(earned)
        .build()
        .expect("valid subsection")
}

fn sample_sheet() -> Sheet {
    let functionality = Section::builder()
        .name("Functionality")
        .order(1)
        .subsections(vec![sub("Sorts", 0, Some(10.0), 8.0), sub("Duplicates", 1, Some(5.0), 4.5)])
        .build()
        .expect("valid section");
    let design = Section::builder()
        .name("Design")
        .order(2)
        .out_of(6.0)
        .subsections(vec![sub("Decomposition", 0, None, 3.0), sub("Naming", 1, None, 2.0)])
        .build()
        .expect("valid section");
    Sheet::new(vec![design, functionality])
}

#[test]
fn section_out_of_forbids_subsection_out_of() {
    let err = Section::builder()
        .name("Design")
        .out_of(10.0)
        .subsections(vec![sub("Decomposition", 0, Some(5.0), 0.0)])
        .build()
        .expect_err("both levels declare out-of");

    assert_eq!(
        err,
        CriteriaError::OutOfOnBoth {
            section:    "Design".into(),
            subsection: "Decomposition".into(),
        }
    );
}

#[test]
fn missing_section_out_of_requires_subsection_out_of() {
    let err = Section::builder()
        .name("Design")
        .subsections(vec![sub("Decomposition", 0, Some(5.0), 0.0), sub("Naming", 1, None, 0.0)])
        .build()
        .expect_err("a subsection is missing its out-of");

    assert_eq!(
        err,
        CriteriaError::OutOfMissing {
            section:    "Design".into(),
            subsection: "Naming".into(),
        }
    );
}

#[test]
fn blank_names_and_bad_points_are_rejected() {
    assert_eq!(
        Subsection::builder().name("  ").out_of(1.0).build(),
        Err(CriteriaError::EmptyName("subsection"))
    );
    assert!(matches!(
        Subsection::builder().name("x").out_of(-1.0).build(),
        Err(CriteriaError::InvalidPoints { .. })
    ));
    assert!(matches!(
        Subsection::builder()
            .name("x")
            .out_of(1.0)
            .earned(f64::NAN)
            .build(),
        Err(CriteriaError::InvalidPoints { .. })
    ));
    assert_eq!(Section::builder().name("").build(), Err(CriteriaError::EmptyName("section")));
}

#[test]
fn iteration_follows_order_with_stable_ties() {
    let section = Section::builder()
        .name("S")
        .subsections(vec![
            sub("c", 5, Some(1.0), 0.0),
            sub("a", 1, Some(1.0), 0.0),
            sub("b", 5, Some(1.0), 0.0),
            sub("z", -3, Some(1.0), 0.0),
        ])
        .build()
        .expect("valid section");

    let names: Vec<&str> = section.subsections().iter().map(Subsection::name).collect();
    assert_eq!(names, vec!["z", "a", "c", "b"]);

    let sheet = sample_sheet();
    let names: Vec<&str> = sheet.sections().iter().map(Section::name).collect();
    assert_eq!(names, vec!["Functionality", "Design"]);
}

#[test]
fn details_are_sorted_and_editable() {
    let mut subsection = Subsection::builder()
        .name("Sorts")
        .out_of(10.0)
        .details(vec![Detail::new("second", 2), Detail::new("first", 1)])
        .build()
        .expect("valid subsection");
    assert_eq!(subsection.details()[0].text(), "first");

    let index = subsection.add_detail("third");
    assert_eq!(index, 2);
    assert_eq!(subsection.details()[2].order(), 3);

    subsection
        .detail_mut(0)
        .expect("detail exists")
        .set_text("first, edited");
    let removed = subsection.remove_detail(1).expect("detail exists");
    assert_eq!(removed.text(), "second");
    assert_eq!(subsection.details().len(), 2);
    assert_eq!(subsection.details()[0].text(), "first, edited");

    assert_eq!(
        subsection.remove_detail(9),
        Err(CriteriaError::NoSuchNode {
            kind:  "detail",
            index: 9,
        })
    );
}

#[test]
fn sections_hold_at_most_one_comment() {
    let mut section = Section::builder()
        .name("Design")
        .subsections(vec![sub("Naming", 0, Some(2.0), 1.0)])
        .build()
        .expect("valid section");

    section.add_comment("Nice work").expect("first comment");
    assert_eq!(
        section.add_comment("Again"),
        Err(CriteriaError::DuplicateComment("Design".into()))
    );
    assert_eq!(section.comment(), Some("Nice work"));

    section.set_comment(Some("Replaced".to_string()));
    assert_eq!(section.comment(), Some("Replaced"));
    section.set_comment(None);
    assert_eq!(section.comment(), None);
}

#[test]
fn totals_add_declared_or_summed_out_of() {
    let sheet = sample_sheet();

    // Functionality: 12.5 / 15 from its subsections; Design: 5 / 6 declared.
    assert_eq!(sheet.sections()[0].total(), Total::new(12.5, 15.0));
    assert_eq!(sheet.sections()[1].total(), Total::new(5.0, 6.0));
    assert_eq!(aggregate(&sheet), Total::new(17.5, 21.0));

    let by_hand: Total = sheet.sections().iter().map(Aggregate::total).sum();
    assert_eq!(aggregate(&sheet), by_hand);
}

#[test]
fn empty_sections_contribute_zero() {
    let empty = Section::builder().name("Empty").build().expect("valid section");
    let declared = Section::builder()
        .name("Declared")
        .out_of(4.0)
        .build()
        .expect("valid section");

    assert_eq!(empty.total(), Total::new(0.0, 0.0));
    assert_eq!(declared.total(), Total::new(0.0, 4.0));
    assert_eq!(aggregate(&Sheet::new(vec![empty, declared])), Total::new(0.0, 4.0));
    assert_eq!(aggregate(&Sheet::default()), Total::default());
}

#[test]
fn ungraded_sheet_has_no_earned_total() {
    let mut sheet = sample_sheet();
    sheet.clear_earned();

    let total = aggregate(&sheet);
    assert_eq!(total.earned, None);
    assert_eq!(total.out_of, Some(21.0));
    assert_eq!(total.percentage(), None);

    // grading one subsection makes the total known again
    let first = SubsectionId {
        section: SectionId(0),
        index:   0,
    };
    sheet
        .subsection_mut(first)
        .expect("subsection exists")
        .set_earned(Some(7.0))
        .expect("finite points");
    assert_eq!(aggregate(&sheet).earned, Some(7.0));
}

#[test]
fn subsection_ids_carry_their_section() {
    let sheet = sample_sheet();
    let ids: Vec<SubsectionId> = sheet.subsection_ids().collect();
    assert_eq!(ids.len(), 4);

    let (section, subsection) = sheet.subsection(ids[3]).expect("subsection exists");
    assert_eq!(section.name(), "Design");
    assert_eq!(subsection.name(), "Naming");
    assert_eq!(ids[3].to_string(), "1.1");

    assert!(
        sheet
            .subsection(SubsectionId {
                section: SectionId(5),
                index:   0,
            })
            .is_err()
    );
}

#[test]
fn instances_reject_section_level_out_of() {
    let err = Instance::new("lab1", "group-7", "1.0", "ADDITIVE", sample_sheet())
        .expect_err("Design declares a section out-of");
    assert_eq!(err, CriteriaError::SectionOutOfInInstance("Design".into()));
}

#[test]
fn instances_renumber_and_carry_metadata() {
    let section = Section::builder()
        .name("Functionality")
        .order(40)
        .subsections(vec![sub("b", 9, Some(1.0), 1.0), sub("a", 3, Some(2.0), 2.0)])
        .build()
        .expect("valid section");
    let instance = Instance::new("lab1", "group-7", "2.1", "SUBTRACTIVE", Sheet::new(vec![section]))
        .expect("valid instance");

    assert_eq!(instance.part().as_str(), "lab1");
    assert_eq!(instance.group().as_str(), "group-7");
    assert_eq!(instance.version(), "2.1");
    assert_eq!(instance.sheet_type(), Some(SheetType::Subtractive));

    let section = &instance.sheet().sections()[0];
    assert_eq!(section.order(), 0);
    let orders: Vec<(i32, &str)> = section
        .subsections()
        .iter()
        .map(|s| (s.order(), s.name()))
        .collect();
    assert_eq!(orders, vec![(0, "a"), (1, "b")]);
    assert_eq!(aggregate(&instance), Total::new(3.0, 3.0));
}

#[test]
fn from_sheet_uses_configured_defaults() {
    gradesheet::config::override_with(gradesheet::config::ConfigState::new(0, "3.0", "SUBTRACTIVE"));

    let section = Section::builder()
        .name("Only")
        .subsections(vec![sub("a", 0, Some(1.0), 1.0)])
        .build()
        .expect("valid section");
    let instance =
        Instance::from_sheet("lab2", "group-1", Sheet::new(vec![section])).expect("valid instance");

    assert_eq!(instance.version(), "3.0");
    assert_eq!(instance.kind(), "SUBTRACTIVE");
}

#[test]
fn instances_must_be_graded() {
    let section = Section::builder()
        .name("Functionality")
        .subsections(vec![sub("a", 0, Some(2.0), 1.0), sub("b", 1, Some(3.0), 0.0)])
        .build()
        .expect("valid section");
    let mut sheet = Sheet::new(vec![section]);
    sheet.clear_earned();

    let err = Instance::new("lab1", "group-7", "1.0", "ADDITIVE", sheet.clone())
        .expect_err("nothing is graded");
    assert_eq!(
        err,
        CriteriaError::Ungraded {
            section:    "Functionality".into(),
            subsection: "a".into(),
        }
    );

    // grading every subsection makes the sheet acceptable again
    for id in sheet.subsection_ids().collect::<Vec<_>>() {
        sheet
            .subsection_mut(id)
            .expect("subsection exists")
            .set_earned(Some(1.0))
            .expect("finite points");
    }
    let mut instance =
        Instance::new("lab1", "group-7", "1.0", "ADDITIVE", sheet).expect("fully graded");

    let missing = SubsectionId {
        section: SectionId(0),
        index:   7,
    };
    assert!(instance.set_earned(missing, 1.0).is_err());
    assert!(matches!(
        instance.set_earned(
            SubsectionId {
                section: SectionId(0),
                index:   0,
            },
            f64::NAN
        ),
        Err(CriteriaError::InvalidPoints { .. })
    ));
    assert_eq!(aggregate(&instance), Total::new(2.0, 5.0));
}

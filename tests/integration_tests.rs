use gramplot::facet::facet_grid;
use gramplot::parser::parse_plot;
use gramplot::resolve::resolve_spec;
use gramplot::{
    aes, geom_contour, geom_histogram, geom_line, geom_point, ggplot, labs, Channel, CoordKind,
    Dataset, FacetSpec, GeomKind, PlotError, PositionKind, RenderOptions, RenderedImage,
    ScaleSpec, StatKind, Warning,
};

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

/// A small CO2-uptake-style dataset: two plants, numeric conc/uptake.
fn co2_data() -> Dataset {
    let csv = "\
conc,uptake,Plant,Type
95,16.0,Qn1,Quebec
175,30.4,Qn1,Quebec
350,37.2,Qn1,Quebec
95,10.6,Mc1,Mississippi
175,19.2,Mc1,Mississippi
350,27.9,Mc1,Mississippi
";
    Dataset::from_csv_reader(csv.as_bytes()).unwrap()
}

/// An iris-style dataset for the histogram scenario.
fn iris_data() -> Dataset {
    let csv = "\
Petal.Width,Species
0.2,setosa
0.3,setosa
1.3,versicolor
1.5,versicolor
2.1,virginica
2.4,virginica
";
    Dataset::from_csv_reader(csv.as_bytes()).unwrap()
}

#[test]
fn test_end_to_end_scatter_plot() {
    let spec = (ggplot(co2_data(), aes().x("conc").y("uptake")) + geom_point()).into_spec();
    let report = gramplot::render(&spec, &RenderOptions::default()).unwrap();
    match report.image {
        RenderedImage::Png(bytes) => assert!(is_valid_png(&bytes)),
        other => panic!("unexpected image: {other:?}"),
    }
    assert!(report.failures.is_empty());
}

#[test]
fn test_end_to_end_coloured_lines() {
    let spec = (ggplot(co2_data(), aes().x("conc").y("uptake").colour("Plant"))
        + geom_line()
        + geom_point())
    .into_spec();
    let report = gramplot::render(&spec, &RenderOptions::default()).unwrap();
    assert!(report.failures.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_histogram_scenario_resolves_to_bin_stack() {
    // {x: Petal.Width, fill: Species} + histogram(binwidth 0.2)
    // resolves to {geom: histogram, stat: bin(0.2), position: stack}
    let spec = (ggplot(iris_data(), aes().x("Petal.Width").fill("Species"))
        + geom_histogram().param("binwidth", 0.2))
    .into_spec();

    let resolution = resolve_spec(&spec);
    assert!(resolution.failures.is_empty());
    let layer = &resolution.layers[0];
    assert_eq!(layer.geom, GeomKind::Histogram);
    assert_eq!(layer.stat, StatKind::Bin);
    assert_eq!(layer.position, PositionKind::Stack);
    assert_eq!(layer.param_f64("binwidth"), Some(0.2));
    // binwidth was explicit, so no fallback warning
    assert!(resolution.warnings.is_empty());

    let report = gramplot::render(&spec, &RenderOptions::default()).unwrap();
    assert!(report.warnings.is_empty());
    assert!(report.failures.is_empty());
}

#[test]
fn test_histogram_without_binwidth_warns_and_renders() {
    let spec = (ggplot(iris_data(), aes().x("Petal.Width")) + geom_histogram()).into_spec();
    let report = gramplot::render(&spec, &RenderOptions::default()).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        Warning::DefaultFallback { stat: StatKind::Bin, .. }
    ));
    match report.image {
        RenderedImage::Png(bytes) => assert!(is_valid_png(&bytes)),
        other => panic!("unexpected image: {other:?}"),
    }
}

#[test]
fn test_contour_missing_z_names_channel_and_siblings_render() {
    let spec = (ggplot(co2_data(), aes().x("conc").y("uptake"))
        + geom_point()
        + geom_contour())
    .into_spec();

    let report = gramplot::render(&spec, &RenderOptions::default()).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].layer, 1);
    let message = report.failures[0].error.to_string();
    assert!(message.contains("`z`"), "{message}");
    assert!(message.contains("contour"), "{message}");
}

#[test]
fn test_facet_grid_n_by_m_cells() {
    // 2 Plant values x 2 Type values
    let data = co2_data();
    for policy in ["fixed", "free", "free_x", "free_y"] {
        let facet = FacetSpec::grid()
            .rows("Plant")
            .cols("Type")
            .policy(gramplot::FacetPolicy::parse(policy).unwrap());
        let grid = facet_grid(&data, Some(&facet)).unwrap();
        assert_eq!(grid.nrow, 2);
        assert_eq!(grid.ncol, 2);
        assert_eq!(grid.cells.len(), 4, "policy {policy} changed cell count");
    }
}

#[test]
fn test_faceted_render() {
    let spec = (ggplot(co2_data(), aes().x("conc").y("uptake"))
        + geom_line()
        + FacetSpec::grid().cols("Plant"))
    .into_spec();
    let report = gramplot::render(&spec, &RenderOptions::default()).unwrap();
    assert!(report.failures.is_empty());
}

#[test]
fn test_branching_saved_plot_two_ways() {
    let base = (ggplot(co2_data(), aes().x("conc").y("uptake")) + geom_point()).into_spec();

    let polar = (&base + CoordKind::Polar).into_spec();
    let labelled = (&base + labs().title("CO2 uptake")).into_spec();

    // The saved base is unaffected by either branch
    assert!(base.coord.is_none());
    assert!(base.labels.title.is_none());

    assert!(gramplot::render(&polar, &RenderOptions::default()).is_ok());
    assert!(gramplot::render(&labelled, &RenderOptions::default()).is_ok());
}

#[test]
fn test_scale_override_reported_once() {
    let composed = ggplot(co2_data(), aes().x("conc").y("uptake"))
        + geom_point()
        + ScaleSpec::continuous(Channel::X).name("first")
        + ScaleSpec::log10(Channel::X);
    assert_eq!(composed.warnings.len(), 1);
    assert_eq!(
        composed.warnings[0],
        Warning::ScaleOverride { channel: Channel::X }
    );
    // Replacement is whole-object: the name of the first scale is gone
    let scale = &composed.spec.scales[&Channel::X];
    assert!(scale.name.is_none());
}

#[test]
fn test_dsl_and_programmatic_specs_match() {
    let from_dsl = parse_plot(
        "ggplot(co2, aes(x: conc, y: uptake, colour: Plant)) + geom_line() + labs(title: \"Uptake\")",
        co2_data(),
    )
    .unwrap();

    let programmatic = (ggplot(co2_data(), aes().x("conc").y("uptake").colour("Plant"))
        + geom_line()
        + labs().title("Uptake"))
    .into_spec();

    assert_eq!(from_dsl.spec, programmatic);
}

#[test]
fn test_dsl_render_end_to_end() {
    let composed = parse_plot(
        "ggplot(iris, aes(x: Petal.Width, fill: Species)) \
         + geom_histogram(binwidth: 0.2) \
         + labs(title: \"Petal widths\", y: \"count\")",
        iris_data(),
    )
    .unwrap();
    let report = gramplot::render(&composed.spec, &RenderOptions::default()).unwrap();
    match report.image {
        RenderedImage::Png(bytes) => assert!(is_valid_png(&bytes)),
        other => panic!("unexpected image: {other:?}"),
    }
}

#[test]
fn test_empty_spec_is_an_error() {
    let spec = ggplot(co2_data(), aes().x("conc").y("uptake"));
    let result = gramplot::render(&spec, &RenderOptions::default());
    assert!(matches!(result, Err(PlotError::EmptyPlot)));
}

#[test]
fn test_unknown_variable_is_attributed() {
    let spec = (ggplot(co2_data(), aes().x("conc").y("missing")) + geom_point()).into_spec();
    let result = gramplot::render(&spec, &RenderOptions::default());
    match result {
        Err(PlotError::AllLayersFailed(inner)) => match *inner {
            PlotError::UnknownVariable { channel, ref variable } => {
                assert_eq!(channel, Channel::Y);
                assert_eq!(variable, "missing");
            }
            ref other => panic!("unexpected inner error: {other:?}"),
        },
        other => panic!("unexpected result: {other:?}"),
    }
}

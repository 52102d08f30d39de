use aquigrid::cross_section::DegenerateKind;
use aquigrid::footprint::Rect;
use aquigrid::package::{ListBoundary, Recharge};
use aquigrid::prelude::*;
use aquigrid::{Collection, ConfigError, Error, InvalidLineError, UnsupportedGridError};

use approx::assert_abs_diff_eq;
use ndarray::{s, Array1, Array2, Array3, Axis};

/// `n` x `n` grid of square cells of width `delta`, with `nlay` layers of equal
/// thickness between `top` and 0
fn square_grid(n: usize, delta: f64, nlay: usize, top: f64) -> StructuredGrid {
    let thickness = top / nlay as f64;
    let mut botm = Array3::zeros((nlay, n, n));
    for (layer, mut bottom) in botm.axis_iter_mut(Axis(0)).enumerate() {
        bottom.fill(top - thickness * (layer + 1) as f64);
    }

    StructuredGrid::new(
        Array1::from_elem(n, delta),
        Array1::from_elem(n, delta),
        Array2::from_elem((n, n), top),
        botm,
    )
    .unwrap()
}

/// the same geometry as a vertex grid
fn as_vertex_grid(structured: &StructuredGrid) -> VertexGrid {
    let (nrow, ncol) = (structured.nrow(), structured.ncol());
    let mut vertices = Vec::new();
    for y in structured.yedges() {
        for x in structured.xedges() {
            vertices.push([*x, *y]);
        }
    }

    let index = |row: usize, col: usize| row * (ncol + 1) + col;
    let cell2d = (0..nrow)
        .flat_map(|row| (0..ncol).map(move |col| (row, col)))
        .map(|(row, col)| {
            vec![
                index(row, col),
                index(row, col + 1),
                index(row + 1, col + 1),
                index(row + 1, col),
            ]
        })
        .collect();

    let top = Array1::from_iter(structured.top().iter().copied());
    let botm = structured
        .botm()
        .clone()
        .into_shape((structured.nlay(), nrow * ncol))
        .unwrap();

    VertexGrid::new(vertices, cell2d, top, botm).unwrap()
}

fn diagonal() -> LineSpec {
    LineSpec::TwoPoint([0.0, 0.0], [10.0, 10.0])
}

#[test]
fn diagonal_crosses_ten_cells() {
    let grid = Grid::from(square_grid(10, 1.0, 1, 1.0));
    let xsect = CrossSection::new(&grid, &diagonal(), ProjectionConfig::default()).unwrap();

    assert_eq!(xsect.projected_cells().len(), 10);

    // every cell on the diagonal has node row * 10 + (9 - row)
    for key in xsect.projected_cells().keys() {
        let (row, col) = grid.as_structured().unwrap().row_col(key.node);
        assert_eq!(row + col, 9, "{key} is off the diagonal");
    }

    // neighbours of the diagonal are only touched at their corners
    assert!(!xsect.touches().is_empty());
    assert_abs_diff_eq!(xsect.total_length(), 10.0 * 2f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn inactive_columns_are_masked() {
    let mut idomain = Array3::ones((1, 10, 10));
    idomain.slice_mut(s![0, .., 0..3]).fill(0);
    let grid = square_grid(10, 1.0, 1, 1.0).with_idomain(idomain).unwrap();
    let grid = Grid::from(grid);

    let xsect = CrossSection::new(&grid, &diagonal(), ProjectionConfig::default()).unwrap();

    match xsect.plot_centers() {
        Collection::Points { points, .. } => assert_eq!(points.len(), 7),
        other => panic!("expected points, got {other:?}"),
    }

    for key in xsect.projected_cells().keys() {
        assert!(grid.is_active(key.layer, key.node), "{key} is inactive");
    }

    assert_eq!(xsect.inactive_cells().len(), 3);
    assert_eq!(xsect.plot_ibound().len(), 3);
}

#[test]
fn inactive_vertex_cells_are_masked() {
    let structured = square_grid(10, 1.0, 1, 1.0);
    let idomain = Array2::from_shape_fn((1, 100), |(_, node)| i32::from(node % 10 >= 3));
    let grid = Grid::from(as_vertex_grid(&structured).with_idomain(idomain).unwrap());

    let xsect = CrossSection::new(&grid, &diagonal(), ProjectionConfig::default()).unwrap();

    assert_eq!(xsect.projected_cells().len(), 7);
    for key in xsect.projected_cells().keys() {
        assert!(key.node % 10 >= 3, "{key} is inactive");
    }
    assert_eq!(xsect.inactive_cells().len(), 3);
    assert_eq!(xsect.plot_ibound().len(), 3);
}

#[test]
fn zero_area_cell_is_skipped_with_a_warning() {
    let vertices = vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [2.0, 0.0],
        [0.0, 1.0],
        [1.0, 1.0],
        [2.0, 1.0],
    ];
    // node 2 runs along the bottom edge and encloses nothing
    let cell2d = vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4], vec![0, 1, 2]];
    let grid = VertexGrid::new(
        vertices,
        cell2d,
        Array1::from_elem(3, 1.0),
        Array2::zeros((1, 3)),
    )
    .unwrap();
    let grid = Grid::from(grid);

    let spec = LineSpec::TwoPoint([0.5, 0.0], [1.5, 1.0]);
    let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

    let nodes: Vec<_> = xsect.projected_cells().keys().map(|k| k.node).collect();
    assert_eq!(nodes, vec![0, 1]);

    let zero_area: Vec<_> = xsect
        .warnings()
        .iter()
        .filter(|w| w.kind == DegenerateKind::ZeroAreaFootprint)
        .collect();
    assert_eq!(zero_area.len(), 1);
    assert_eq!(zero_area[0].node, 2);
    assert_eq!(zero_area[0].layer, None);
}

#[test]
fn missing_elevations_are_rejected() {
    let mut top = Array2::from_elem((3, 3), 1.0);
    top[[1, 1]] = f64::NAN;
    let result = StructuredGrid::new(Array1::ones(3), Array1::ones(3), top, Array3::zeros((1, 3, 3)));
    assert!(matches!(result, Err(UnsupportedGridError::NonFinite(_))));

    let result = StructuredGrid::new(
        Array1::ones(0),
        Array1::ones(3),
        Array2::zeros((3, 0)),
        Array3::zeros((1, 3, 0)),
    );
    assert!(matches!(result, Err(UnsupportedGridError::Empty)));
}

#[test]
fn invalid_tolerance_is_rejected() {
    let grid = Grid::from(square_grid(3, 1.0, 1, 1.0));
    for tolerance in [-1.0, 0.0, f64::NAN] {
        let result = CrossSection::new(&grid, &LineSpec::Row(1), ProjectionConfig { tolerance });
        assert!(matches!(
            result,
            Err(Error::InvalidConfig(ConfigError::InvalidTolerance(_)))
        ));
    }
}

#[test]
fn pipeline_is_idempotent() {
    let grid = Grid::from(square_grid(20, 50.0, 3, 100.0));
    let spec = LineSpec::Vertices(vec![[10.0, 990.0], [400.0, 610.0], [777.7, 20.3], [999.0, 500.0]]);

    let a = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();
    let b = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

    assert_eq!(a, b);
    let keys_a: Vec<_> = a.projected_cells().keys().collect();
    let keys_b: Vec<_> = b.projected_cells().keys().collect();
    assert_eq!(keys_a, keys_b);
}

#[test]
fn centers_lie_inside_their_cells() {
    let grid = Grid::from(square_grid(20, 50.0, 3, 100.0));
    let spec = LineSpec::Vertices(vec![[0.0, 0.0], [333.0, 999.0], [1000.0, 12.5]]);
    let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

    assert!(!xsect.projected_cells().is_empty());
    for cell in xsect.projected_cells().values() {
        let [station, elevation] = cell.center();
        assert!(cell.start < station && station < cell.end, "{}", cell.key);
        assert!(cell.bottom < elevation && elevation < cell.top, "{}", cell.key);
        assert!(cell.start >= 0.0 && cell.end <= xsect.total_length() + 1e-9);
    }
}

#[test]
fn cells_are_ordered_by_layer_then_node() {
    let grid = Grid::from(square_grid(5, 1.0, 2, 2.0));
    let spec = LineSpec::Vertices(vec![[4.5, 0.5], [0.5, 4.5]]);
    let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

    let keys: Vec<_> = xsect.projected_cells().keys().copied().collect();
    let mut sorted = keys.clone();
    sorted.sort_by_key(|key| (key.layer, key.node, key.part));
    assert_eq!(keys, sorted);
    assert_eq!(keys.first().map(|k| k.layer), Some(0));
    assert_eq!(keys.last().map(|k| k.layer), Some(1));
}

#[test]
fn line_along_shared_edge_belongs_to_both_rows() {
    let grid = Grid::from(square_grid(10, 1.0, 1, 1.0));
    let spec = LineSpec::TwoPoint([0.0, 5.0], [10.0, 5.0]);
    let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

    // rows 4 (y in [5, 6]) and 5 (y in [4, 5])
    assert_eq!(xsect.projected_cells().len(), 20);
    let rows: std::collections::BTreeSet<_> = xsect
        .projected_cells()
        .keys()
        .map(|key| key.node / 10)
        .collect();
    assert_eq!(rows.into_iter().collect::<Vec<_>>(), vec![4, 5]);
}

#[test]
fn grazing_corner_only_touches() {
    let grid = Grid::from(square_grid(2, 1.0, 1, 1.0));
    // passes through the shared corner of all four cells, inside nodes 0 and 3
    let spec = LineSpec::TwoPoint([0.0, 2.0], [2.0, 0.0]);
    let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

    let nodes: Vec<_> = xsect.projected_cells().keys().map(|k| k.node).collect();
    assert_eq!(nodes, vec![0, 3]);

    let touched: Vec<_> = xsect.touches().keys().copied().collect();
    assert_eq!(touched, vec![1, 2]);
    assert_eq!(xsect.warnings().len(), 2);
}

#[test]
fn vertex_grid_matches_structured_grid() {
    let structured = square_grid(8, 12.5, 2, 40.0);
    let vertex = as_vertex_grid(&structured);
    let structured = Grid::from(structured);
    let vertex = Grid::from(vertex);

    let spec = LineSpec::Vertices(vec![[3.0, 97.0], [61.0, 42.0], [99.0, 7.0]]);
    let a = CrossSection::new(&structured, &spec, ProjectionConfig::default()).unwrap();
    let b = CrossSection::new(&vertex, &spec, ProjectionConfig::default()).unwrap();

    let keys_a: Vec<_> = a.projected_cells().keys().collect();
    let keys_b: Vec<_> = b.projected_cells().keys().collect();
    assert_eq!(keys_a, keys_b);

    for (cell_a, cell_b) in a.projected_cells().values().zip(b.projected_cells().values()) {
        assert_abs_diff_eq!(cell_a.start, cell_b.start, epsilon = 1e-9);
        assert_abs_diff_eq!(cell_a.end, cell_b.end, epsilon = 1e-9);
        assert_eq!(cell_a.top, cell_b.top);
        assert_eq!(cell_a.bottom, cell_b.bottom);
    }
}

#[test]
fn row_line_draws_boundary_conditions_as_patches() {
    let structured = square_grid(20, 50.0, 3, 100.0);

    let mut chd = ListBoundary::new("CHD");
    for layer in 0..3 {
        for row in 0..20 {
            chd.push_structured(&structured, 0, layer, row, 0);
            chd.push_structured(&structured, 0, layer, row, 19);
        }
    }
    let rch = Recharge::new(20, 20);

    let grid = Grid::from(structured);
    let xsect = CrossSection::new(&grid, &LineSpec::Row(10), ProjectionConfig::default()).unwrap();

    let chd = xsect.plot_bc(&chd, 0);
    assert!(chd.is_polygon());
    assert_eq!(chd.len(), 6);

    let rch = xsect.plot_bc(&rch, 0);
    assert!(rch.is_polygon());
    assert_eq!(rch.len(), 20);
    assert_eq!(rch.label(), "RCH");
}

#[test]
fn user_axis_limits_are_preserved() {
    let grid = Grid::from(square_grid(20, 50.0, 1, 100.0));
    let xsect = CrossSection::new(&grid, &LineSpec::Column(4), ProjectionConfig::default()).unwrap();

    assert_eq!(xsect.line().vertices(), &[[225.0, 1000.0], [225.0, 0.0]]);

    let limits = Rect::new(0.0, 500.0, 0.0, 25.0);
    let mut axes = Axes::with_limits(limits);
    axes.draw(&xsect, xsect.plot_grid());
    assert_eq!(axes.limits(), Some(limits));

    let mut axes = Axes::new();
    axes.draw(&xsect, xsect.plot_grid());
    assert_eq!(axes.limits(), Some(Rect::new(0.0, 1000.0, 0.0, 100.0)));
    assert_eq!(axes.limits(), xsect.extent());
}

#[test]
fn row_line_on_vertex_grid_is_rejected() {
    let vertex = Grid::from(as_vertex_grid(&square_grid(2, 1.0, 1, 1.0)));
    let result = CrossSection::new(&vertex, &LineSpec::Row(0), ProjectionConfig::default());
    assert!(matches!(
        result,
        Err(Error::InvalidLine(InvalidLineError::RequiresStructuredGrid))
    ));
}

#[test]
fn section_exports_as_polydata() {
    let grid = Grid::from(square_grid(10, 1.0, 2, 2.0));
    let xsect = CrossSection::new(&grid, &diagonal(), ProjectionConfig::default()).unwrap();

    let values = Array2::from_shape_fn((2, 100), |(layer, node)| (layer * 100 + node) as f64);
    let collections = vec![
        xsect.plot_array(values.view(), &[]).unwrap(),
        xsect.plot_grid(),
        xsect.plot_centers(),
    ];

    let mut output = Vec::new();
    aquigrid::write_vtp(&mut output, &collections, aquigrid::Encoding::Ascii).unwrap();
    let xml = String::from_utf8(output).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
    assert!(xml.contains("type=\"PolyData\""));
    assert_eq!(xml.matches("<Piece").count(), 3);
    assert!(xml.contains("NumberOfPolys=\"20\""));
    assert!(xml.contains("NumberOfVerts=\"20\""));
}

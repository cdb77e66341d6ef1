//! Ruling-line table detection.
//!
//! Painted segments are snapped and joined into edges, edges are intersected, every
//! intersection looks for the smallest rectangle it closes with edges on all four
//! sides, and cells that share corners are grouped into tables.

use std::collections::{BTreeMap, BTreeSet};

use crate::extraction::geometry::{BBox, Orientation, PageLayout, Ruling};
use crate::extraction::layout::text_within;
use crate::extraction::models::Table;
use crate::extraction::settings::{LayoutParams, TableSettings};

/// Intersection coordinates are compared at this resolution (thousandths of a point).
fn key(v: f64) -> i64 {
    (v * 1000.0).round() as i64
}

#[derive(Debug, Default)]
struct Intersection {
    horizontal: BTreeSet<usize>,
    vertical: BTreeSet<usize>,
}

pub fn find_tables(
    page: &PageLayout,
    settings: &TableSettings,
    layout: &LayoutParams,
) -> Vec<Table> {
    let edges = merge_edges(&page.rulings, settings);
    let (horizontal, vertical): (Vec<Ruling>, Vec<Ruling>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Horizontal);

    let intersections = intersect(&horizontal, &vertical, settings.intersection_tolerance);
    let cells = build_cells(&intersections);
    let mut tables: Vec<Vec<BBox>> = group_cells(cells)
        .into_iter()
        .filter(|t| t.len() >= 2)
        .collect();
    tables.sort_by(|a, b| {
        let (ta, tb) = (bounds(a), bounds(b));
        tb.y1.total_cmp(&ta.y1).then(ta.x0.total_cmp(&tb.x0))
    });

    tables
        .iter()
        .map(|cells| fill_table(cells, page, layout))
        .filter(|t| !t.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Edges
// ────────────────────────────────────────────────────────────────────────────

/// Filters short segments, snaps near-collinear ones onto a shared coordinate,
/// then joins overlapping collinear segments.
fn merge_edges(rulings: &[Ruling], settings: &TableSettings) -> Vec<Ruling> {
    let mut merged = Vec::new();
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        let mut edges: Vec<Ruling> = rulings
            .iter()
            .filter(|r| r.orientation == orientation && r.length() >= settings.edge_min_length)
            .copied()
            .collect();
        snap(&mut edges, settings.snap_tolerance);
        merged.extend(join(edges, settings.snap_tolerance));
    }
    merged
}

fn snap(edges: &mut [Ruling], tolerance: f64) {
    edges.sort_by(|a, b| a.position.total_cmp(&b.position));
    let mut start = 0;
    while start < edges.len() {
        let mut end = start + 1;
        while end < edges.len() && edges[end].position - edges[end - 1].position <= tolerance {
            end += 1;
        }
        let mean =
            edges[start..end].iter().map(|e| e.position).sum::<f64>() / (end - start) as f64;
        for edge in &mut edges[start..end] {
            edge.position = mean;
        }
        start = end;
    }
}

fn join(mut edges: Vec<Ruling>, tolerance: f64) -> Vec<Ruling> {
    edges.sort_by(|a, b| {
        a.position
            .total_cmp(&b.position)
            .then(a.start.total_cmp(&b.start))
    });
    let mut joined: Vec<Ruling> = Vec::with_capacity(edges.len());
    for edge in edges {
        match joined.last_mut() {
            Some(last)
                if key(last.position) == key(edge.position)
                    && edge.start <= last.end + tolerance =>
            {
                last.end = last.end.max(edge.end);
            }
            _ => joined.push(edge),
        }
    }
    joined
}

fn intersect(
    horizontal: &[Ruling],
    vertical: &[Ruling],
    tolerance: f64,
) -> BTreeMap<(i64, i64), Intersection> {
    let mut points: BTreeMap<(i64, i64), Intersection> = BTreeMap::new();
    for (vi, v) in vertical.iter().enumerate() {
        for (hi, h) in horizontal.iter().enumerate() {
            let x_hit = v.position >= h.start - tolerance && v.position <= h.end + tolerance;
            let y_hit = h.position >= v.start - tolerance && h.position <= v.end + tolerance;
            if x_hit && y_hit {
                let point = points.entry((key(v.position), key(h.position))).or_default();
                point.horizontal.insert(hi);
                point.vertical.insert(vi);
            }
        }
    }
    points
}

// ────────────────────────────────────────────────────────────────────────────
// Cells and tables
// ────────────────────────────────────────────────────────────────────────────

type Point = (i64, i64);

/// True when a single edge runs through both points.
fn connects(points: &BTreeMap<Point, Intersection>, a: Point, b: Point) -> bool {
    let (Some(pa), Some(pb)) = (points.get(&a), points.get(&b)) else {
        return false;
    };
    if a.1 == b.1 {
        return !pa.horizontal.is_disjoint(&pb.horizontal);
    }
    if a.0 == b.0 {
        return !pa.vertical.is_disjoint(&pb.vertical);
    }
    false
}

fn build_cells(points: &BTreeMap<Point, Intersection>) -> Vec<BBox> {
    // Column by column, top to bottom.
    let mut ordered: Vec<Point> = points.keys().copied().collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut cells = Vec::new();
    for (i, &top_left) in ordered.iter().enumerate() {
        let rest = &ordered[i + 1..];
        let below: Vec<Point> = rest.iter().copied().filter(|p| p.0 == top_left.0).collect();
        let right: Vec<Point> = rest.iter().copied().filter(|p| p.1 == top_left.1).collect();

        'search: for &below_pt in &below {
            if !connects(points, top_left, below_pt) {
                continue;
            }
            for &right_pt in &right {
                if !connects(points, top_left, right_pt) {
                    continue;
                }
                let bottom_right = (right_pt.0, below_pt.1);
                if points.contains_key(&bottom_right)
                    && connects(points, bottom_right, right_pt)
                    && connects(points, bottom_right, below_pt)
                {
                    cells.push(BBox::new(
                        top_left.0 as f64 / 1000.0,
                        below_pt.1 as f64 / 1000.0,
                        right_pt.0 as f64 / 1000.0,
                        top_left.1 as f64 / 1000.0,
                    ));
                    break 'search;
                }
            }
        }
    }
    cells
}

fn corners(cell: &BBox) -> [Point; 4] {
    [
        (key(cell.x0), key(cell.y0)),
        (key(cell.x0), key(cell.y1)),
        (key(cell.x1), key(cell.y0)),
        (key(cell.x1), key(cell.y1)),
    ]
}

/// Groups cells that share at least one corner.
fn group_cells(cells: Vec<BBox>) -> Vec<Vec<BBox>> {
    let mut groups: Vec<(BTreeSet<Point>, Vec<BBox>)> = Vec::new();
    for cell in cells {
        let cell_corners: BTreeSet<Point> = corners(&cell).into_iter().collect();
        let mut merged: (BTreeSet<Point>, Vec<BBox>) = (cell_corners, vec![cell]);
        let mut rest = Vec::with_capacity(groups.len());
        for group in groups {
            if group.0.is_disjoint(&merged.0) {
                rest.push(group);
            } else {
                merged.0.extend(group.0);
                merged.1.extend(group.1);
            }
        }
        rest.push(merged);
        groups = rest;
    }
    groups.into_iter().map(|(_, cells)| cells).collect()
}

fn bounds(cells: &[BBox]) -> BBox {
    cells
        .iter()
        .skip(1)
        .fold(cells[0], |acc, cell| acc.union(cell))
}

/// Lays cells out on the grid of distinct tops and lefts and fills each with its text.
/// Rows without any non-empty cell are dropped.
fn fill_table(cells: &[BBox], page: &PageLayout, layout: &LayoutParams) -> Table {
    let tops: BTreeSet<i64> = cells.iter().map(|c| key(c.y1)).collect();
    let lefts: BTreeSet<i64> = cells.iter().map(|c| key(c.x0)).collect();

    tops.iter()
        .rev()
        .map(|&top| {
            lefts
                .iter()
                .map(|&left| {
                    cells
                        .iter()
                        .find(|c| key(c.y1) == top && key(c.x0) == left)
                        .map(|c| text_within(&page.glyphs, c, layout))
                })
                .collect::<Vec<Option<String>>>()
        })
        .filter(|row| row.iter().any(|c| c.as_deref().is_some_and(|t| !t.is_empty())))
        .collect()
}

//! The drawing-stream walk: drawing groups, shape groups, shapes and their
//! properties.
//!
//! Shape-group containers may declare a logical coordinate system (FSPGR)
//! against which descendant child anchors are rescaled onto the group's
//! absolute rectangle. Rather than mutating shared anchor state, the walk
//! threads two rectangles down the recursion and a shape that defines a
//! coordinate system hands updated values back up to its group's loop.

use super::{
    EscherContainerInfo, container_type, extract_escher_values, field_ids, find_escher_container,
    find_escher_container_in_set, element_tail_length,
};
use crate::binary::StreamCursor;
use crate::collector::Collector;
use crate::error::Result;
use crate::fill::{Fill, FillKind, GradientFill, ImgFill, PatternFill, SolidFill};
use crate::ole::OleSource;
use crate::parser::PubParser;
use crate::shape::{
    BorderPosition, Coordinate, DEFAULT_LINE_WIDTH_EMU, DEFAULT_TEXT_MARGIN_EMU, FLAG_LEFT_INSET_PEN,
    FLAG_LEFT_INSET_PEN_OK, FLAG_LINE, FLAG_USE_LEFT_INSET_PEN, FLAG_USE_LEFT_INSET_PEN_OK,
    FLAG_USE_LINE, Line, SF_FLIP_H, SF_FLIP_V, SF_GROUP, ShapeType,
};
use crate::style::ColorReference;
use log::{debug, warn};
use std::collections::HashMap;

/// Coordinate state a shape defining its own coordinate system hands back to
/// the enclosing group walk.
struct GroupFrame {
    coord_system: Coordinate,
    group_absolute: Coordinate,
}

/// A line exists unless its boolean property word requests a line switch
/// that is off. An absent word means no line at all.
fn line_exists_by_flags(flags: Option<u32>) -> bool {
    match flags {
        Some(f) => !((f & FLAG_USE_LINE != 0) && (f & FLAG_LINE == 0)),
        None => false,
    }
}

/// Convert a 16.16 fixed-point value to f64.
fn to_fixed_point(value: i32) -> f64 {
    f64::from(value) / 65536.0
}

/// Modulo normalized into `[0, divisor)`.
fn double_modulo(value: f64, divisor: f64) -> f64 {
    let rem = value % divisor;
    if rem < 0.0 { rem + divisor } else { rem }
}

/// Swap a rectangle's width and height about its center, for shapes whose
/// rotation lands them a quarter-turn away.
fn quarter_rotated(rect: Coordinate) -> Coordinate {
    let width = rect.width();
    let height = rect.height();
    let center_x = rect.xs + width / 2;
    let center_y = rect.ys + height / 2;
    let xs = center_x - height / 2;
    let ys = center_y - width / 2;
    Coordinate::new(xs, ys, xs + height, ys + width)
}

impl<S: OleSource, C: Collector> PubParser<'_, S, C> {
    pub(crate) fn parse_escher(&mut self, data: &[u8]) -> Result<()> {
        let mut cursor = StreamCursor::new(data);
        let root = EscherContainerInfo {
            initial: 0,
            record_type: 0,
            contents_offset: 0,
            contents_length: data.len(),
        };
        // The drawing-group container comes before any drawing with images.
        if let Some(dgg) = find_escher_container(&mut cursor, &root, container_type::DGG_CONTAINER)? {
            if let Some(bstore) =
                find_escher_container(&mut cursor, &root, container_type::B_STORE_CONTAINER)?
            {
                self.parse_bstore(&mut cursor, &bstore)?;
            }
            cursor.seek(dgg.contents_end() + element_tail_length(container_type::DGG_CONTAINER));
        }
        while let Some(dg) =
            find_escher_container(&mut cursor, &root, container_type::DG_CONTAINER)?
        {
            while let Some(spgr) =
                find_escher_container(&mut cursor, &dg, container_type::SPGR_CONTAINER)?
            {
                self.parse_shape_group(
                    &mut cursor,
                    &spgr,
                    true,
                    Coordinate::default(),
                    Coordinate::default(),
                )?;
            }
            let resume = cursor.tell();
            cursor.seek(resume + element_tail_length(container_type::DG_CONTAINER));
        }
        Ok(())
    }

    /// Walk the B-store and assign a delay index to every child that has
    /// image data (detected by a non-zero quad at offset 10 of the entry).
    fn parse_bstore(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        bstore: &EscherContainerInfo,
    ) -> Result<()> {
        let mut current_delay_index: u32 = 1;
        while cursor.still_reading(bstore.contents_end()) {
            let begin = cursor.tell();
            cursor.seek(begin + 10);
            let has_data = cursor.read_u32()? != 0
                || cursor.read_u32()? != 0
                || cursor.read_u32()? != 0
                || cursor.read_u32()? != 0;
            if has_data {
                self.delay_indices.push(Some(current_delay_index));
                current_delay_index += 1;
            } else {
                self.delay_indices.push(None);
            }
            cursor.seek(begin + 44);
        }
        Ok(())
    }

    fn parse_shape_group(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        spgr: &EscherContainerInfo,
        top_level: bool,
        parent_coord_system: Coordinate,
        parent_group_absolute: Coordinate,
    ) -> Result<()> {
        let mut coord_system = parent_coord_system;
        let mut group_absolute = parent_group_absolute;
        const CHILD_TYPES: [u16; 2] = [
            container_type::SPGR_CONTAINER,
            container_type::SP_CONTAINER,
        ];
        while let Some(child) = find_escher_container_in_set(cursor, spgr, &CHILD_TYPES)? {
            match child.record_type {
                container_type::SPGR_CONTAINER => {
                    self.collector.begin_group();
                    self.parse_shape_group(cursor, &child, false, coord_system, group_absolute)?;
                    self.collector.end_group();
                },
                _ => {
                    if let Some(frame) =
                        self.parse_escher_shape(cursor, &child, top_level, coord_system, group_absolute)?
                    {
                        coord_system = frame.coord_system;
                        group_absolute = frame.group_absolute;
                    }
                },
            }
            cursor.seek(child.contents_end() + element_tail_length(child.record_type));
        }
        Ok(())
    }

    /// Parse one shape container and emit its facts.
    ///
    /// `parent_coord_system` is the rectangle child anchors are measured in;
    /// `parent_group_absolute` is where that rectangle lands on the page.
    /// When the shape carries an FSPGR record it defines the coordinate
    /// system for its descendants and the returned frame replaces the
    /// caller's state for subsequent siblings.
    fn parse_escher_shape(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        sp: &EscherContainerInfo,
        top_level: bool,
        parent_coord_system: Coordinate,
        parent_group_absolute: Coordinate,
    ) -> Result<Option<GroupFrame>> {
        // Child anchors of this shape are still measured in the coordinate
        // system in force before its own FSPGR.
        let this_coord_system = parent_coord_system;
        let mut defines_relative_coordinates = false;
        let mut new_coord_system = parent_coord_system;
        let mut group_absolute = parent_group_absolute;

        if let Some(fspgr) = find_escher_container(cursor, sp, container_type::FSPGR)? {
            cursor.seek(fspgr.contents_offset);
            new_coord_system = Coordinate::new(
                cursor.read_u32()? as i32,
                cursor.read_u32()? as i32,
                cursor.read_u32()? as i32,
                cursor.read_u32()? as i32,
            );
            defines_relative_coordinates = true;
        }

        cursor.seek(sp.contents_offset);
        let mut shape_type = ShapeType::Rectangle;
        let mut shape_flags = 0u32;
        let mut is_group_leader = false;
        if let Some(fsp) = find_escher_container(cursor, sp, container_type::FSP)? {
            shape_type = ShapeType::from(fsp.rec_instance());
            cursor.seek(fsp.contents_offset + 4);
            shape_flags = cursor.read_u32()?;
            is_group_leader = shape_flags & SF_GROUP != 0;
        }

        cursor.seek(sp.contents_offset);
        if let Some(client_data) = find_escher_container(cursor, sp, container_type::CLIENT_DATA)? {
            let data_values = extract_escher_values(cursor, &client_data)?;
            if let Some(&shape_seq_num) = data_values.get(&field_ids::SHAPE_ID) {
                self.collector.set_shape_type(shape_seq_num, shape_type);
                self.collector.set_shape_flip(
                    shape_seq_num,
                    shape_flags & SF_FLIP_V != 0,
                    shape_flags & SF_FLIP_H != 0,
                );
                cursor.seek(sp.contents_offset);
                if is_group_leader {
                    self.collector.set_current_group_seq_num(shape_seq_num);
                } else {
                    self.collector.set_shape_order(shape_seq_num);
                }

                const ANCHOR_TYPES: [u16; 2] = [
                    container_type::CLIENT_ANCHOR,
                    container_type::CHILD_ANCHOR,
                ];
                let anchor = find_escher_container_in_set(cursor, sp, &ANCHOR_TYPES)?;
                let mut rotated_90 = false;
                if anchor.is_some() || is_group_leader {
                    debug!(
                        "escher data for {} of seqnum 0x{shape_seq_num:x}",
                        if is_group_leader { "group" } else { "shape" }
                    );
                    cursor.seek(sp.contents_offset);
                    if let Some(fopt) = find_escher_container(cursor, sp, container_type::FOPT)? {
                        let fopt_values = extract_escher_values(cursor, &fopt)?;
                        rotated_90 = self.apply_shape_properties(cursor, sp, shape_seq_num, &fopt_values)?;
                    }
                    if let Some(anchor) = anchor {
                        let mut absolute = self.resolve_anchor(
                            cursor,
                            &anchor,
                            this_coord_system,
                            parent_group_absolute,
                        )?;
                        if rotated_90 {
                            absolute = quarter_rotated(absolute);
                        }
                        self.collector.set_shape_coordinates_in_emu(
                            shape_seq_num,
                            absolute.xs,
                            absolute.ys,
                            absolute.xe,
                            absolute.ye,
                        );
                        if defines_relative_coordinates {
                            group_absolute = absolute;
                        }
                    }
                }
                if !top_level {
                    self.collector.add_shape(shape_seq_num);
                }
            }
        }

        Ok(defines_relative_coordinates.then_some(GroupFrame {
            coord_system: new_coord_system,
            group_absolute,
        }))
    }

    /// Apply the FOPT property map: image reference, lines, fill, adjust
    /// values, rotation and text margins. Returns whether the rotation puts
    /// the shape a quarter-turn away.
    fn apply_shape_properties(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        sp: &EscherContainerInfo,
        shape_seq_num: u32,
        fopt_values: &HashMap<u16, u32>,
    ) -> Result<bool> {
        if let Some(&px_id) = fopt_values.get(&field_ids::PXID) {
            debug!("shape 0x{shape_seq_num:x} has pxId {px_id}");
            if let Some(delay_index) = self.resolve_delay_index(px_id) {
                self.collector.set_shape_img_index(shape_seq_num, delay_index);
            } else {
                warn!("no delay index for pxId {px_id}");
            }
        }

        let line_color = fopt_values.get(&field_ids::LINE_COLOR).copied();
        let line_flags = fopt_values.get(&field_ids::LINE_STYLE_BOOL_PROPS).copied();
        let use_line = line_exists_by_flags(line_flags);
        let (fill, skip_if_not_bg) = self.make_fill(fopt_values);

        if let (Some(color), true) = (line_color, use_line) {
            let width = fopt_values
                .get(&field_ids::LINE_WIDTH)
                .copied()
                .unwrap_or(DEFAULT_LINE_WIDTH_EMU);
            self.collector.add_shape_line(
                shape_seq_num,
                Line::new(ColorReference::new(color), width, true),
            );
        } else {
            cursor.seek(sp.contents_offset);
            if let Some(tertiary) =
                find_escher_container(cursor, sp, container_type::TERTIARY_FOPT)?
            {
                let tertiary_values = extract_escher_values(cursor, &tertiary)?;
                self.apply_tertiary_lines(shape_seq_num, &tertiary_values);
            }
        }

        if let Some(fill) = fill {
            self.collector.set_shape_fill(shape_seq_num, fill, skip_if_not_bg);
        }

        for (index, field) in [
            field_ids::ADJUST_VALUE_1,
            field_ids::ADJUST_VALUE_2,
            field_ids::ADJUST_VALUE_3,
        ]
        .iter()
        .enumerate()
        {
            if let Some(&value) = fopt_values.get(field) {
                self.collector.set_adjust_value(shape_seq_num, index, value as i32);
            }
        }

        let mut rotated_90 = false;
        if let Some(&raw_rotation) = fopt_values.get(&field_ids::ROTATION) {
            let rotation = double_modulo(to_fixed_point(raw_rotation as i32), 360.0);
            self.collector.set_shape_rotation(shape_seq_num, rotation as i16);
            rotated_90 = (45.0..135.0).contains(&rotation) || (225.0..315.0).contains(&rotation);
        }

        let margin = |field: u16| {
            fopt_values
                .get(&field)
                .copied()
                .unwrap_or(DEFAULT_TEXT_MARGIN_EMU)
        };
        self.collector.set_shape_margins(
            shape_seq_num,
            margin(field_ids::DY_TEXT_LEFT),
            margin(field_ids::DY_TEXT_TOP),
            margin(field_ids::DY_TEXT_RIGHT),
            margin(field_ids::DY_TEXT_BOTTOM),
        );
        Ok(rotated_90)
    }

    /// Emit the four per-side lines of a tertiary FOPT, in top, right,
    /// bottom, left order, then the border position.
    fn apply_tertiary_lines(&mut self, shape_seq_num: u32, values: &HashMap<u16, u32>) {
        if !line_exists_by_flags(values.get(&field_ids::LINE_STYLE_BOOL_PROPS).copied()) {
            return;
        }
        let sides = [
            (
                field_ids::LINE_TOP_COLOR,
                field_ids::LINE_TOP_WIDTH,
                field_ids::LINE_TOP_BOOL_PROPS,
            ),
            (
                field_ids::LINE_RIGHT_COLOR,
                field_ids::LINE_RIGHT_WIDTH,
                field_ids::LINE_RIGHT_BOOL_PROPS,
            ),
            (
                field_ids::LINE_BOTTOM_COLOR,
                field_ids::LINE_BOTTOM_WIDTH,
                field_ids::LINE_BOTTOM_BOOL_PROPS,
            ),
            (
                field_ids::LINE_LEFT_COLOR,
                field_ids::LINE_LEFT_WIDTH,
                field_ids::LINE_LEFT_BOOL_PROPS,
            ),
        ];
        for (color_field, width_field, flags_field) in sides {
            let color = values.get(&color_field).copied();
            let exists =
                color.is_some() && line_exists_by_flags(values.get(&flags_field).copied());
            let line = if exists {
                Line::new(
                    ColorReference::new(color.unwrap_or(0)),
                    values
                        .get(&width_field)
                        .copied()
                        .unwrap_or(DEFAULT_LINE_WIDTH_EMU),
                    true,
                )
            } else {
                Line::invisible()
            };
            self.collector.add_shape_line(shape_seq_num, line);
        }

        // Four flag bits of the left line encode one boolean: whether the
        // border is drawn fully inside the shape outline.
        let left_flags = values.get(&field_ids::LINE_LEFT_BOOL_PROPS).copied();
        let inside = matches!(left_flags, Some(f) if
            f & FLAG_USE_LEFT_INSET_PEN != 0
                && (f & FLAG_USE_LEFT_INSET_PEN_OK == 0 || f & FLAG_LEFT_INSET_PEN_OK != 0)
                && f & FLAG_LEFT_INSET_PEN != 0);
        self.collector.set_shape_border_position(
            shape_seq_num,
            if inside {
                BorderPosition::InsideShape
            } else {
                BorderPosition::HalfInsideShape
            },
        );
    }

    /// Resolve an anchor record into absolute page coordinates.
    fn resolve_anchor(
        &mut self,
        cursor: &mut StreamCursor<'_>,
        anchor: &EscherContainerInfo,
        coord_system: Coordinate,
        group_absolute: Coordinate,
    ) -> Result<Coordinate> {
        if anchor.record_type == container_type::CLIENT_ANCHOR {
            let anchor_values = extract_escher_values(cursor, anchor)?;
            let value = |field: u16| anchor_values.get(&field).copied().unwrap_or(0) as i32;
            return Ok(Coordinate::new(
                value(field_ids::XS),
                value(field_ids::YS),
                value(field_ids::XE),
                value(field_ids::YE),
            ));
        }

        // Child anchor: affine map from the group's coordinate system onto
        // its absolute rectangle, one axis at a time.
        cursor.seek(anchor.contents_offset);
        let raw_xs = cursor.read_u32()? as i32;
        let raw_ys = cursor.read_u32()? as i32;
        let raw_xe = cursor.read_u32()? as i32;
        let raw_ye = cursor.read_u32()? as i32;
        let width_scale = f64::from(group_absolute.width()) / f64::from(coord_system.width());
        let height_scale = f64::from(group_absolute.height()) / f64::from(coord_system.height());
        let map_x = |x: i32| {
            (f64::from(x - coord_system.xs) * width_scale + f64::from(group_absolute.xs)) as i32
        };
        let map_y = |y: i32| {
            (f64::from(y - coord_system.ys) * height_scale + f64::from(group_absolute.ys)) as i32
        };
        Ok(Coordinate::new(
            map_x(raw_xs),
            map_y(raw_ys),
            map_x(raw_xe),
            map_y(raw_ye),
        ))
    }

    /// Resolve a 1-based `pxId` through the delay-index table.
    fn resolve_delay_index(&self, px_id: u32) -> Option<u32> {
        if px_id == 0 {
            return None;
        }
        self.delay_indices.get(px_id as usize - 1).copied().flatten()
    }

    /// Build the fill for a shape from its FOPT properties.
    ///
    /// The second value reports whether a solid fill was marked as only
    /// applying to background shapes.
    fn make_fill(&self, fopt_values: &HashMap<u16, u32>) -> (Option<Fill>, bool) {
        let kind = fopt_values
            .get(&field_ids::FILL_TYPE)
            .map(|&v| FillKind::from(v))
            .unwrap_or(FillKind::Solid);
        let opacity = |field: u16| {
            fopt_values
                .get(&field)
                .map(|&v| f64::from(v) / f64::from(0xFFFFu32))
                .unwrap_or(1.0)
        };
        match kind {
            FillKind::Solid => {
                let style_props = fopt_values.get(&field_ids::FIELD_STYLE_BOOL_PROPS);
                let skip_if_not_bg = matches!(style_props, Some(p) if p & 0xF0 == 0);
                if let Some(&color) = fopt_values.get(&field_ids::FILL_COLOR) {
                    if !skip_if_not_bg {
                        let fill = SolidFill {
                            color: ColorReference::new(color),
                            opacity: opacity(field_ids::FILL_OPACITY),
                        };
                        return (Some(Fill::Solid(fill)), skip_if_not_bg);
                    }
                }
                (None, skip_if_not_bg)
            },
            FillKind::Gradient => {
                let fill_color = fopt_values
                    .get(&field_ids::FILL_COLOR)
                    .copied()
                    .unwrap_or(0x00FF_FFFF);
                let back_color = fopt_values
                    .get(&field_ids::FILL_BACK_COLOR)
                    .copied()
                    .unwrap_or(0x00FF_FFFF);
                let front = ColorReference::with_modified(fill_color, fill_color);
                let back = ColorReference::with_modified(fill_color, back_color);
                let front_opacity = opacity(field_ids::FILL_OPACITY);
                let back_opacity = opacity(field_ids::FILL_BACK_OPACITY);
                let fill_focus = fopt_values
                    .get(&field_ids::FILL_FOCUS)
                    .map(|&v| v as u16 as i16)
                    .unwrap_or(0);
                let mut angle = fopt_values
                    .get(&field_ids::FILL_ANGLE)
                    .map(|&v| (v as i32) >> 16)
                    .unwrap_or(0);
                // Some angles are stored offset by 90 degrees; the remap is
                // empirical.
                angle = match angle {
                    -135 => -45,
                    -45 => 225,
                    other => other,
                };
                let mut gradient = GradientFill::new(angle);
                if fill_focus == 0 {
                    gradient.add_color(front, 0, front_opacity);
                    gradient.add_color(back, 100, back_opacity);
                } else if fill_focus == 100 {
                    gradient.add_color(back, 0, back_opacity);
                    gradient.add_color(front, 100, front_opacity);
                } else if fill_focus > 0 {
                    gradient.add_color(front, 0, front_opacity);
                    gradient.add_color(back, i32::from(fill_focus), back_opacity);
                    gradient.add_color(front, 100, front_opacity);
                } else {
                    gradient.add_color(back, 0, back_opacity);
                    gradient.add_color(front, 100 + i32::from(fill_focus), front_opacity);
                    gradient.add_color(back, 100, back_opacity);
                }
                (Some(Fill::Gradient(gradient)), false)
            },
            FillKind::Texture | FillKind::Bitmap => {
                let img = fopt_values
                    .get(&field_ids::BG_PXID)
                    .and_then(|&px_id| self.resolve_delay_index(px_id));
                match img {
                    Some(img_index) => (
                        Some(Fill::Image(ImgFill {
                            img_index,
                            is_texture: kind == FillKind::Texture,
                        })),
                        false,
                    ),
                    None => (None, false),
                }
            },
            FillKind::Pattern => {
                let foreground = fopt_values
                    .get(&field_ids::FILL_COLOR)
                    .map(|&c| ColorReference::new(c))
                    .unwrap_or(ColorReference::new(0x00FF_FFFF));
                let background = fopt_values
                    .get(&field_ids::FILL_BACK_COLOR)
                    .map(|&c| ColorReference::new(c))
                    .unwrap_or(ColorReference::new(0x0800_0000));
                let img = fopt_values
                    .get(&field_ids::BG_PXID)
                    .and_then(|&px_id| self.resolve_delay_index(px_id));
                match img {
                    Some(img_index) => (
                        Some(Fill::Pattern(PatternFill {
                            img_index,
                            foreground,
                            background,
                        })),
                        false,
                    ),
                    None => (None, false),
                }
            },
            FillKind::Other => (None, false),
        }
    }
}

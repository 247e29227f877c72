//! Command-style text descriptions of graphics.

use std::fmt::Write;

use fegraphics_render::{RenderType, SelectMode};

use crate::graphic::Graphic;
use crate::kind::{ElementSampling, GlyphParameters, GraphicKind, IsoValues, StreamlineSeed};
use crate::types::DescriptionDetail;

fn xyz(values: [f64; 3]) -> String {
    format!("{}*{}*{}", values[0], values[1], values[2])
}

fn describe_glyph(out: &mut String, glyph: &GlyphParameters) {
    let name = glyph.glyph.as_ref().map_or("none", |g| g.name());
    let _ = write!(
        out,
        " glyph {name} {} size \"{}\" centre {}",
        glyph.scaling_mode.token(),
        xyz(glyph.base_size),
        xyz(glyph.centre)
    );
    if let Some(field) = &glyph.orientation_scale_field {
        let _ = write!(out, " orientation {field}");
    }
    if let Some(field) = &glyph.variable_scale_field {
        let _ = write!(out, " variable_scale {field}");
    }
    let _ = write!(out, " scale_factors \"{}\"", xyz(glyph.scale_factors));
}

fn describe_sampling(out: &mut String, sampling: &ElementSampling) {
    let _ = write!(out, " {}", sampling.mode.token());
    if let Some(field) = &sampling.density_field {
        let _ = write!(out, " density {field}");
    }
    if sampling.mode == fegraphics_core::XiSamplingMode::ExactXi {
        let _ = write!(
            out,
            " xi {},{},{}",
            sampling.exact_xi[0], sampling.exact_xi[1], sampling.exact_xi[2]
        );
    }
}

impl Graphic {
    /// Describes the graphic as a command string.
    ///
    /// [`DescriptionDetail::Geometry`] lists only settings shaping the geometry;
    /// the complete forms add appearance, and the position form prefixes the
    /// list position.
    #[must_use]
    pub fn describe(&self, detail: DescriptionDetail) -> String {
        let mut out = String::new();
        if detail == DescriptionDetail::CompletePlusPosition {
            let _ = write!(out, "position {} ", self.position);
        }
        out.push_str(self.graphic_type().token());
        if let Some(name) = &self.name {
            let _ = write!(out, " as {name}");
        }
        if let Some(field) = &self.coordinate_field {
            let _ = write!(out, " coordinate {field}");
        }
        if self.graphic_type().uses_elements() {
            if self.exterior {
                out.push_str(" exterior");
            }
            let _ = write!(out, " face {}", self.face.token());
            match &self.tessellation {
                Some(tessellation) => {
                    let _ = write!(out, " tessellation {}", tessellation.name());
                }
                None => {
                    let d = self.discretization;
                    let _ = write!(out, " discretization \"{}*{}*{}\"", d[0], d[1], d[2]);
                }
            }
            if let Some(field) = &self.native_discretization_field {
                let _ = write!(out, " native_discretization {field}");
            }
        }
        if let Some(field) = &self.visibility_field {
            let _ = write!(out, " visibility_field {field}");
        }
        self.describe_kind(&mut out);

        if detail == DescriptionDetail::Geometry {
            return out;
        }
        if let Some(field) = &self.texture_coordinate_field {
            let _ = write!(out, " texture_coordinates {field}");
        }
        if self.uses_circle_divisions() && self.tessellation.is_none() {
            let _ = write!(out, " circle_discretization {}", self.circle_discretization);
        }
        if let Some(field) = &self.data_field {
            let _ = write!(out, " data {field}");
        }
        if let Some(spectrum) = &self.spectrum {
            let _ = write!(out, " spectrum {}", spectrum.name);
        }
        if self.line_width != 0 {
            let _ = write!(out, " line_width {}", self.line_width);
        }
        let select = match self.select_mode {
            SelectMode::On => "select_on",
            SelectMode::NoSelect => "no_select",
            SelectMode::DrawSelected => "draw_selected",
            SelectMode::DrawUnselected => "draw_unselected",
        };
        let _ = write!(out, " {select}");
        if let Some(material) = &self.material {
            let _ = write!(out, " material {}", material.name);
        }
        if let Some(material) = &self.selected_material {
            let _ = write!(out, " selected_material {}", material.name);
        }
        if let Some(material) = &self.secondary_material {
            let _ = write!(out, " secondary_material {}", material.name);
        }
        if self.render_type == RenderType::Wireframe {
            out.push_str(" render_wireframe");
        } else {
            out.push_str(" render_shaded");
        }
        if let Some(order) = self.overlay_order {
            let _ = write!(out, " overlay {order}");
        }
        if !self.visibility_flag {
            out.push_str(" invisible");
        }
        out
    }

    fn describe_kind(&self, out: &mut String) {
        if let Some(points) = self.kind.point_attributes() {
            describe_glyph(out, &points.glyph);
            if let Some(field) = &points.label_field {
                let _ = write!(out, " label {field}");
            }
        }
        match &self.kind {
            GraphicKind::Cylinders(c) => {
                let _ = write!(out, " constant_radius {}", c.constant_radius);
                if let Some(field) = &c.radius_scalar_field {
                    let _ = write!(out, " radius_scalar {field} scale_factor {}", c.scale_factor);
                }
            }
            GraphicKind::IsoSurfaces(iso) => {
                let _ = write!(out, " {}", iso.use_element_type.token());
                if let Some(field) = &iso.scalar_field {
                    let _ = write!(out, " iso_scalar {field}");
                }
                match &iso.values {
                    IsoValues::List(values) => {
                        let list: Vec<String> = values.iter().map(ToString::to_string).collect();
                        let _ = write!(out, " iso_values {}", list.join(" "));
                    }
                    IsoValues::Range { count, first, last } => {
                        let _ = write!(
                            out,
                            " range_number_of_iso_values {count} first_iso_value {first} \
                             last_iso_value {last}"
                        );
                    }
                }
                if iso.decimation_threshold > 0.0 {
                    let _ = write!(out, " decimation_threshold {}", iso.decimation_threshold);
                }
            }
            GraphicKind::ElementPoints(e) => {
                let _ = write!(out, " {}", e.use_element_type.token());
                describe_sampling(out, &e.sampling);
            }
            GraphicKind::Streamlines(s) => {
                let _ = write!(out, " {}", s.streamline_type.token());
                if let Some(field) = &s.vector_field {
                    let _ = write!(out, " vector {field}");
                }
                let _ = write!(out, " length {} width {}", s.length, s.width);
                if s.reverse {
                    out.push_str(" reverse_track");
                }
                let _ = write!(out, " {}", s.data_type.token());
                match &s.seed {
                    StreamlineSeed::AllElements => {}
                    StreamlineSeed::Element(element) => {
                        let _ = write!(out, " seed_element {}", element.number);
                    }
                    StreamlineSeed::Nodes {
                        domain,
                        mesh_location_field,
                    } => {
                        let _ = write!(
                            out,
                            " seed_node_{} {mesh_location_field}",
                            match domain {
                                fegraphics_core::NodeDomain::Nodes => "nodes",
                                fegraphics_core::NodeDomain::Data => "data",
                            }
                        );
                    }
                }
                describe_sampling(out, &s.sampling);
            }
            GraphicKind::Volumes(v) => {
                if let Some(texture) = &v.texture {
                    let _ = write!(out, " vtexture {}", texture.name);
                }
                if let Some(element) = v.seed_element {
                    let _ = write!(out, " seed_element {}", element.number);
                }
            }
            _ => {}
        }
    }
}

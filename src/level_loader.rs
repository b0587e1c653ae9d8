use anyhow::{Context, Result};
use cgmath::*;
use image::RgbaImage;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use xml::attribute::OwnedAttribute;
use xml::reader::{EventReader, XmlEvent};

use crate::{
    geom::Bounds,
    level::LevelGeometry,
    mask::{CollisionMask, HazardMask},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Solid,
    Hazard,
}

/// A playable level: its geometry plus where the body enters it.
#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    pub spawn_point: Point2<f32>,
    pub geometry: LevelGeometry,
}

fn attr<'a>(attributes: &'a [OwnedAttribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name.local_name == name)
        .map(|a| a.value.as_str())
}

fn parse_attr<T>(attributes: &[OwnedAttribute], element: &str, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = attr(attributes, name)
        .with_context(|| format!("<{}> element missing a '{}' attribute.", element, name))?;
    value.trim().parse().with_context(|| {
        format!(
            "Expected to parse '{}' attr of <{}>, got \"{}\"",
            name, element, value
        )
    })
}

fn parse_rect(attributes: &[OwnedAttribute]) -> Result<Bounds> {
    let x: f32 = parse_attr(attributes, "rect", "x")?;
    let y: f32 = parse_attr(attributes, "rect", "y")?;
    let width: f32 = parse_attr(attributes, "rect", "width")?;
    let height: f32 = parse_attr(attributes, "rect", "height")?;
    if width < 0.0 || height < 0.0 {
        anyhow::bail!("<rect> must have non-negative width and height");
    }
    Ok(Bounds::new(point2(x, y), vec2(width, height)))
}

impl Level {
    /// Loads a level descriptor; image sources resolve relative to the descriptor's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let parent_dir = path
            .parent()
            .context("Expect level file to have parent dir")?;
        let file =
            File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
        Self::parse(BufReader::new(file), parent_dir)
            .with_context(|| format!("Unable to load level from {}", path.display()))
    }

    pub fn parse<R: Read>(reader: R, base_dir: &Path) -> Result<Self> {
        Self::parse_with(reader, |source| {
            let image_path = base_dir.join(source);
            let image = image::open(&image_path)
                .with_context(|| format!("Unable to load image {}", image_path.display()))?;
            Ok(image.to_rgba8())
        })
    }

    /// Parses a level descriptor, asking `load_image` for the pixels of each `<image source>`.
    pub fn parse_with<R, F>(reader: R, mut load_image: F) -> Result<Self>
    where
        R: Read,
        F: FnMut(&str) -> Result<RgbaImage>,
    {
        let parser = EventReader::new(reader);

        let mut name: Option<String> = None;
        let mut size: Option<(u32, u32)> = None;
        let mut spawn_point: Option<Point2<f32>> = None;
        let mut solid: Option<CollisionMask> = None;
        let mut hazard: Option<HazardMask> = None;
        let mut section: Option<Section> = None;

        for e in parser {
            match e.context("Malformed level xml")? {
                XmlEvent::StartElement {
                    name: element,
                    attributes,
                    ..
                } => {
                    let element = element.local_name;

                    if let Some(current) = section {
                        // only geometry primitives are allowed in <solid>/<hazard>
                        let mask = match current {
                            Section::Solid => solid.as_mut(),
                            Section::Hazard => hazard.as_mut().map(|h| h.mask_mut()),
                        }
                        .context("Geometry section without an enclosing <level>")?;

                        match element.as_str() {
                            "rect" => {
                                let rect = parse_rect(&attributes)?;
                                mask.fill_rect(&rect, true);
                            }
                            "image" => {
                                let source = attr(&attributes, "source")
                                    .context("<image> element missing a 'source' attribute.")?;
                                let image = load_image(source).with_context(|| {
                                    format!("Expected to load <image> source \"{}\"", source)
                                })?;
                                let x: i32 = parse_attr(&attributes, "image", "x")?;
                                let y: i32 = if attr(&attributes, "y").is_some() {
                                    parse_attr(&attributes, "image", "y")?
                                } else if attr(&attributes, "bottom").is_some() {
                                    let bottom: i32 = parse_attr(&attributes, "image", "bottom")?;
                                    bottom.checked_sub(image.height() as i32).with_context(|| {
                                        format!("<image> 'bottom' attr {} is out of range", bottom)
                                    })?
                                } else {
                                    anyhow::bail!(
                                        "<image> element needs either a 'y' or a 'bottom' attribute."
                                    );
                                };
                                mask.blit_image(&image, x, y);
                            }
                            other => anyhow::bail!(
                                "Unexpected <{}> element inside a geometry section",
                                other
                            ),
                        }
                        continue;
                    }

                    match element.as_str() {
                        "level" => {
                            let width: u32 = parse_attr(&attributes, "level", "width")?;
                            let height: u32 = parse_attr(&attributes, "level", "height")?;
                            if width == 0 || height == 0 {
                                anyhow::bail!("<level> must have a non-zero width and height");
                            }
                            name = Some(attr(&attributes, "name").unwrap_or("").to_string());
                            size = Some((width, height));
                            solid = Some(CollisionMask::new(width, height));
                        }
                        "spawn" => {
                            let x: f32 = parse_attr(&attributes, "spawn", "x")?;
                            let y: f32 = parse_attr(&attributes, "spawn", "y")?;
                            spawn_point = Some(point2(x, y));
                        }
                        "solid" => {
                            section = Some(Section::Solid);
                        }
                        "hazard" => {
                            let (width, height) =
                                size.context("<hazard> element outside of a <level>")?;
                            if hazard.is_none() {
                                hazard = Some(HazardMask::new(width, height));
                            }
                            section = Some(Section::Hazard);
                        }
                        other => {
                            log::warn!("Ignoring unrecognized <{}> element in level", other);
                        }
                    }
                }
                XmlEvent::EndElement { name: element } => match element.local_name.as_str() {
                    "solid" | "hazard" => section = None,
                    _ => {}
                },
                _ => {}
            }
        }

        // verify all required fields were loaded
        let (width, height) = size.context("Expected to read a <level> element")?;
        let name = name.unwrap_or_default();
        let spawn_point = spawn_point.context("Expected to read a <spawn> element")?;
        let solid = solid.context("Expected <level> to have produced a solid mask")?;

        let bounds = Bounds::new(point2(0.0, 0.0), vec2(width as f32, height as f32));
        let geometry = LevelGeometry::new(solid, hazard, bounds)?;

        log::debug!(
            "Loaded level \"{}\" ({}x{}), {} solid pixels",
            name,
            width,
            height,
            geometry.solid().count_solid()
        );

        Ok(Level {
            name,
            spawn_point,
            geometry,
        })
    }
}

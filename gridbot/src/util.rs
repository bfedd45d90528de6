use std::path::Path;

use image::{DynamicImage, GenericImageView};

use crate::grid::{Cell, GridMap};

/// Convert a thresholded image into an obstacle grid: pixels with a red channel below 128
/// are obstacles, every other pixel is a free cell of cost 1.
pub fn parse_img(img: &DynamicImage) -> Result<GridMap, anyhow::Error> {
    let width = img.width() as usize;
    let height = img.height() as usize;

    if width == 0 || height == 0 {
        return Err(anyhow::anyhow!("image has no pixels"));
    }

    let mut cells = vec![vec![Cell::Obstacle; width]; height];

    for (row, line) in cells.iter_mut().enumerate() {
        for (col, cell) in line.iter_mut().enumerate() {
            let p = img.get_pixel(col as u32, row as u32);

            *cell = if p.0[0] < 128 {
                Cell::Obstacle
            } else {
                Cell::Free { cost: 1 }
            }
        }
    }

    Ok(GridMap {
        rows: height,
        columns: width,
        cells,
    })
}

pub fn load_img(path: impl AsRef<Path>) -> Result<GridMap, anyhow::Error> {
    let img = image::open(path)?;
    parse_img(&img)
}

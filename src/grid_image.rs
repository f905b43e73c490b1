//! Drawing a filled (or partially filled) grid as an image: black blocks, white open cells, and
//! each letter centered in its cell.

use ab_glyph::{FontRef, InvalidFont, PxScale};
use image::{ImageError, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use thiserror::Error;

use crate::assignment::Assignment;
use crate::grid_config::{letter_grid, GridCell, GridConfig};

/// The side of each square cell, in pixels.
pub const CELL_SIZE: u32 = 100;

/// The width of the black edge around each open cell.
pub const CELL_BORDER: u32 = 2;

const FONT_SCALE: f32 = 80.0;

const FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Error)]
pub enum GridImageError {
    #[error("couldn't load the embedded font: {0}")]
    Font(#[from] InvalidFont),

    #[error("a {width}x{height} grid is too large to draw")]
    TooLarge { width: usize, height: usize },

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Draw the grid with the words of `assignment` in place. Open cells without a letter are left
/// blank.
pub fn draw_grid(
    config: &GridConfig,
    assignment: &Assignment,
) -> Result<RgbaImage, GridImageError> {
    let too_large = || GridImageError::TooLarge {
        width: config.width,
        height: config.height,
    };
    let canvas_width = u32::try_from(config.width)
        .ok()
        .and_then(|width| width.checked_mul(CELL_SIZE))
        .ok_or_else(too_large)?;
    let canvas_height = u32::try_from(config.height)
        .ok()
        .and_then(|height| height.checked_mul(CELL_SIZE))
        .ok_or_else(too_large)?;

    let font = FontRef::try_from_slice(FONT_DATA)?;
    let scale = PxScale::from(FONT_SCALE);
    let interior_size = CELL_SIZE - 2 * CELL_BORDER;

    let mut image = RgbaImage::from_pixel(canvas_width, canvas_height, BLACK);

    for (row, cells) in (0u32..).zip(letter_grid(config, assignment)) {
        for (col, cell) in (0u32..).zip(cells) {
            if cell == GridCell::Block {
                continue;
            }

            // Both coordinates fit in the canvas, which we've already sized as a `u32`.
            let left = (col * CELL_SIZE + CELL_BORDER) as i32;
            let top = (row * CELL_SIZE + CELL_BORDER) as i32;
            draw_filled_rect_mut(
                &mut image,
                Rect::at(left, top).of_size(interior_size, interior_size),
                WHITE,
            );

            if let GridCell::Letter(ch) = cell {
                let text: String = ch.to_uppercase().collect();
                let (text_width, text_height) = text_size(scale, &font, &text);
                let x = left + (i64::from(interior_size) - i64::from(text_width)) as i32 / 2;
                let y = top + (i64::from(interior_size) - i64::from(text_height)) as i32 / 2;
                draw_text_mut(&mut image, BLACK, x, y, scale, &font, &text);
            }
        }
    }

    Ok(image)
}

/// Draw the grid and save it to `path`. The format is picked from the file extension.
pub fn save_grid(
    config: &GridConfig,
    assignment: &Assignment,
    path: &Path,
) -> Result<(), GridImageError> {
    let image = draw_grid(config, assignment)?;
    image.save(path)?;
    log::info!(
        "Saved {}x{} grid image to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::assignment::Assignment;
    use crate::backtracking_search::solve;
    use crate::crossword::generate_grid_config_from_template_string;
    use crate::grid_image::{draw_grid, save_grid, CELL_BORDER, CELL_SIZE};
    use crate::word_list::tests::{memory_word_list, resource_path};
    use crate::word_list::WordList;
    use image::{GenericImageView, Rgba};
    use std::{env, fs, process};

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_save_grid_for_structure0() {
        let template = fs::read_to_string(resource_path("structure0.txt")).unwrap();
        let word_list = WordList::from_file(&resource_path("words0.txt"), None).unwrap();
        let grid_config = generate_grid_config_from_template_string(word_list, &template).unwrap();
        let config = grid_config.to_config_ref();
        let assignment = solve(&config).expect("Failed to find a fill");

        let path = env::temp_dir().join(format!("crossword_structure0_{}.png", process::id()));
        save_grid(&config, &assignment, &path).unwrap();
        let image = image::open(&path).unwrap().to_rgba8();
        fs::remove_file(&path).unwrap();

        assert_eq!(image.dimensions(), (5 * CELL_SIZE, 5 * CELL_SIZE));

        // (0, 0) is a block and (0, 1) holds the "S" of "six".
        assert_eq!(*image.get_pixel(CELL_SIZE / 2, CELL_SIZE / 2), BLACK);
        assert_eq!(*image.get_pixel(CELL_SIZE, 0), BLACK);
        assert_eq!(
            *image.get_pixel(CELL_SIZE + CELL_BORDER + 1, CELL_BORDER + 1),
            WHITE
        );

        let interior = image.view(
            CELL_SIZE + CELL_BORDER,
            CELL_BORDER,
            CELL_SIZE - 2 * CELL_BORDER,
            CELL_SIZE - 2 * CELL_BORDER,
        );
        assert!(interior.pixels().any(|(_, _, pixel)| pixel.0[0] < 128));
    }

    #[test]
    fn test_unfilled_cells_are_blank() {
        let grid_config = generate_grid_config_from_template_string(
            memory_word_list(&["cat", "at"]),
            "___\n#__",
        )
        .unwrap();
        let config = grid_config.to_config_ref();

        let image = draw_grid(&config, &Assignment::new(config.variable_configs.len())).unwrap();

        assert_eq!(image.dimensions(), (3 * CELL_SIZE, 2 * CELL_SIZE));
        assert_eq!(
            *image.get_pixel(CELL_SIZE / 2, CELL_SIZE + CELL_SIZE / 2),
            BLACK
        );
        for row in 0..2 {
            for col in 0..3 {
                if (row, col) == (1, 0) {
                    continue;
                }
                let (x, y) = (col * CELL_SIZE, row * CELL_SIZE);
                assert_eq!(
                    *image.get_pixel(x + CELL_SIZE / 2, y + CELL_SIZE / 2),
                    WHITE
                );
                assert_eq!(*image.get_pixel(x, y), BLACK);
            }
        }
    }
}

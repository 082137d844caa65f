use image::GrayImage;

/// Variance-of-Laplacian sharpness metric over the whole frame.
///
/// Higher means sharper; a perfectly flat image scores 0. Uses the classic
/// 4-neighbour Laplacian kernel.
#[must_use]
pub fn blur_score(image: &GrayImage) -> f64 {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let mut responses = Vec::with_capacity(((width - 2) * (height - 2)) as usize);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let center = f64::from(image.get_pixel(x, y)[0]);
            let up = f64::from(image.get_pixel(x, y - 1)[0]);
            let down = f64::from(image.get_pixel(x, y + 1)[0]);
            let left = f64::from(image.get_pixel(x - 1, y)[0]);
            let right = f64::from(image.get_pixel(x + 1, y)[0]);
            responses.push(up + down + left + right - 4.0 * center);
        }
    }

    let n = responses.len() as f64;
    let mean = responses.iter().sum::<f64>() / n;
    responses.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_scores_zero() {
        let img = GrayImage::from_pixel(32, 32, image::Luma([128]));
        assert!(blur_score(&img) < f64::EPSILON);
    }

    #[test]
    fn checkerboard_scores_high() {
        let img = GrayImage::from_fn(32, 32, |x, y| {
            if (x + y) % 2 == 0 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        });
        assert!(blur_score(&img) > 1000.0);
    }

    #[test]
    fn tiny_image_scores_zero() {
        let img = GrayImage::from_pixel(2, 2, image::Luma([10]));
        assert_eq!(blur_score(&img), 0.0);
    }
}

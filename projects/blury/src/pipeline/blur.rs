// Region blurring: routes detections to face, person or plate blurs and
// writes the filtered pixels back into the working image.

use crate::pipeline::face::FaceLocator;
use crate::pipeline::filter::BlurFilter;
use crate::pipeline::geometry::{clamp_to_image, plate_region};
use crate::pipeline::types::{BBox, BlurAction, BlurSummary, Detection, PersonBlur};
use anyhow::Result;
use opencv::core::{Mat, Rect};
use opencv::prelude::*;

/// Blur every relevant detection, in list order.
///
/// Persons get a face blur (or a whole-person blur if no face is found),
/// vehicles get a plate blur, everything else is left alone.
pub fn blur_detections(
    image: &mut Mat,
    detections: &[Detection],
    faces: &mut dyn FaceLocator,
    filter: &BlurFilter,
) -> Result<BlurSummary> {
    let mut summary = BlurSummary::default();

    for detection in detections {
        tracing::debug!(
            "{} ({:.2}) at {}",
            detection.label,
            detection.confidence,
            detection.bbox
        );
        match BlurAction::for_label(&detection.label) {
            BlurAction::Person => match blur_person(image, &detection.bbox, faces, filter)? {
                PersonBlur::Face => summary.faces += 1,
                PersonBlur::WholePerson => summary.persons += 1,
                PersonBlur::Empty => {
                    tracing::debug!("Nothing to blur for person box {}", detection.bbox)
                }
            },
            BlurAction::Plate => {
                if blur_plate(image, &detection.bbox, filter)? {
                    summary.plates += 1;
                } else {
                    tracing::debug!("Plate region of {} is outside the image", detection.bbox);
                }
            }
            BlurAction::Ignore => summary.ignored += 1,
        }
    }

    Ok(summary)
}

/// Blur the face found inside a person box, or the whole box when there is none.
///
/// When several faces are found only the last one reported is blurred.
pub fn blur_person(
    image: &mut Mat,
    bbox: &BBox,
    faces: &mut dyn FaceLocator,
    filter: &BlurFilter,
) -> Result<PersonBlur> {
    let Some(person_rect) = clamp_to_image(bbox, image.size()?) else {
        return Ok(PersonBlur::Empty);
    };

    let mut person = crop(image, person_rect)?;
    let found = faces.locate(&person)?;

    let outcome = match found.last() {
        Some(face) => {
            if found.len() > 1 {
                tracing::debug!(
                    "{} faces in person box {}, blurring the last one",
                    found.len(),
                    bbox
                );
            }
            // A face that falls outside the crop leaves the person untouched.
            let Some(face_rect) = clamp_to_image(&face.as_bbox(), person.size()?) else {
                return Ok(PersonBlur::Empty);
            };
            blur_rect(&mut person, face_rect, filter)?;
            PersonBlur::Face
        }
        None => {
            person = filter.apply(&person)?;
            PersonBlur::WholePerson
        }
    };

    paste(image, person_rect, &person)?;
    Ok(outcome)
}

/// Blur the estimated license plate area of a vehicle box.
///
/// Returns `false` when the plate area falls entirely outside the image.
pub fn blur_plate(image: &mut Mat, bbox: &BBox, filter: &BlurFilter) -> Result<bool> {
    let plate = plate_region(bbox);
    match clamp_to_image(&plate, image.size()?) {
        Some(rect) => {
            blur_rect(image, rect, filter)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Filter one rectangle of `image` in place.
fn blur_rect(image: &mut Mat, rect: Rect, filter: &BlurFilter) -> Result<()> {
    let region = crop(image, rect)?;
    let blurred = filter.apply(&region)?;
    paste(image, rect, &blurred)
}

/// Owned copy of a rectangle, so filtering does not read pixels outside it.
fn crop(image: &Mat, rect: Rect) -> Result<Mat> {
    let roi = Mat::roi(image, rect)?;
    let mut out = Mat::default();
    roi.copy_to(&mut out)?;
    Ok(out)
}

fn paste(image: &mut Mat, rect: Rect, patch: &Mat) -> Result<()> {
    let mut roi = Mat::roi_mut(image, rect)?;
    patch.copy_to(&mut roi)?;
    Ok(())
}

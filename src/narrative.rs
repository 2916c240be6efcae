//! Canned narrative text for the report.
//!
//! The product name is interpolated verbatim; it is never validated or escaped.

/// The three narrative passages of a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Narrative {
    pub executive_summary: String,
    pub interpretation: String,
    pub recommendations: String,
}

/// Builds the narrative passages for `product`.
pub fn generate_narrative(product: &str) -> Narrative {
    Narrative {
        executive_summary: format!(
            "The LCA of the {product} reveals significant environmental impacts primarily during \
             manufacturing and disposal. This report synthesizes known data and simulates a full \
             cradle-to-grave analysis."
        ),
        interpretation: format!(
            "For the {product}, the use phase has a minor cumulative effect, while manufacturing \
             contributes the largest emissions due to energy-intensive materials like lithium \
             batteries and plastics."
        ),
        recommendations: format!(
            "Recommendations for the {product} include modular design, recyclable batteries, and \
             public awareness around e-waste."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_appears_in_every_passage() {
        let narrative = generate_narrative("Electric Toothbrush");
        for passage in [
            &narrative.executive_summary,
            &narrative.interpretation,
            &narrative.recommendations,
        ] {
            assert!(passage.contains("Electric Toothbrush"), "{passage}");
        }
    }

    #[test]
    fn empty_product_is_interpolated_as_is() {
        let narrative = generate_narrative("");
        assert!(narrative
            .recommendations
            .starts_with("Recommendations for the  include"));
    }

    #[test]
    fn special_characters_are_kept_verbatim() {
        let narrative = generate_narrative("Kettle <2L> & \"Pro\"");
        assert!(narrative.executive_summary.contains("Kettle <2L> & \"Pro\""));
    }
}

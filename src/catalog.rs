// Static emotion-to-product catalog

use crate::models::Emotion;

/// Shown when no catalog entry applies
pub const FALLBACK_PRODUCTS: &[&str] = &["No products available"];

/// Returns the ordered product list for an emotion.
///
/// The match is exhaustive over `Emotion`, so adding a variant without a
/// product list fails to compile instead of falling through at runtime.
pub fn products_for(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Happy => &["Joyful Juice", "Cheerful Chocolate", "Happy Hoodie"],
        Emotion::Sad => &["Comfort Blanket", "Warm Tea", "Inspirational Book"],
        Emotion::Angry => &["Stress Ball", "Calming Tea", "Meditation App"],
        Emotion::Surprised => &["Exciting Gadgets", "Adventure Gear", "Surprise Box"],
        Emotion::Neutral => &[
            "Laptop- www.google.com \u{2764}\u{fe0f}\u{200d}\u{1f525}",
            "Healthy Snacks",
            "Relaxing Music",
        ],
        Emotion::Fear => &["Safety Kit", "Comfort Food", "Stress Relief Kit"],
        Emotion::Disgust => &["Refreshing Drink", "Cleanser", "Aromatherapy Kit"],
        Emotion::Unknown => FALLBACK_PRODUCTS,
    }
}

/// Joins a product list into the single line shown under the video
pub fn recommendation_text(products: &[&str]) -> String {
    products.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_emotion_has_products() {
        for emotion in Emotion::KNOWN {
            let products = products_for(emotion);
            assert!(!products.is_empty(), "{emotion} has no products");
            assert_ne!(products, FALLBACK_PRODUCTS, "{emotion} hit the fallback");
        }
    }

    #[test]
    fn lookup_is_deterministic_and_ordered() {
        assert_eq!(
            products_for(Emotion::Happy),
            &["Joyful Juice", "Cheerful Chocolate", "Happy Hoodie"]
        );
        assert_eq!(products_for(Emotion::Happy), products_for(Emotion::Happy));
    }

    #[test]
    fn unknown_maps_to_fallback() {
        assert_eq!(products_for(Emotion::Unknown), FALLBACK_PRODUCTS);
    }

    #[test]
    fn recommendation_text_joins_with_comma() {
        assert_eq!(
            recommendation_text(products_for(Emotion::Fear)),
            "Safety Kit, Comfort Food, Stress Relief Kit"
        );
        assert_eq!(recommendation_text(&[]), "");
    }
}

//! Checkout page ordering.
//!
//! The checkout is a fixed linear sequence of pages. Every "Step N of M"
//! indicator and every "next page" redirect is derived from [`CHECKOUT_PAGES`].

use std::fmt;

/// A page of the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutPage {
    /// Cart review.
    Detail,
    /// Shipping address form.
    Address,
    /// Payment details form.
    Payment,
    /// Read-only order summary.
    Summary,
}

/// The checkout pages in the order the visitor walks through them.
pub const CHECKOUT_PAGES: [CheckoutPage; 4] = [
    CheckoutPage::Detail,
    CheckoutPage::Address,
    CheckoutPage::Payment,
    CheckoutPage::Summary,
];

impl CheckoutPage {
    /// URL path of the page.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Detail => "/checkout/step-1",
            Self::Address => "/checkout/step-2",
            Self::Payment => "/checkout/step-3",
            Self::Summary => "/checkout/order-summary",
        }
    }

    /// Heading shown on the page.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Detail => "Shopping Cart",
            Self::Address => "Shipping Address",
            Self::Payment => "Payment Details",
            Self::Summary => "Order Summary",
        }
    }

    /// Look up a page by its path.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        CHECKOUT_PAGES.into_iter().find(|page| page.path() == path)
    }

    /// 1-based position in [`CHECKOUT_PAGES`].
    #[must_use]
    pub fn step(self) -> usize {
        CHECKOUT_PAGES
            .iter()
            .position(|page| *page == self)
            .map_or(0, |index| index + 1)
    }

    /// The page after this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        CHECKOUT_PAGES.get(self.step()).copied()
    }

    /// The page before this one, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.step()
            .checked_sub(2)
            .and_then(|index| CHECKOUT_PAGES.get(index).copied())
    }

    /// Progress indicator for this page.
    #[must_use]
    pub fn progress(self) -> Progress {
        Progress {
            step: self.step(),
            total: CHECKOUT_PAGES.len(),
        }
    }
}

/// 1-based position of the page served at `path`.
#[must_use]
pub fn page_index(path: &str) -> Option<usize> {
    CheckoutPage::from_path(path).map(CheckoutPage::step)
}

/// "Step N of M".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub step: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of {}", self.step, self.total)
    }
}

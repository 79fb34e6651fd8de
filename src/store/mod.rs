//! Capability-scoped access to the store's endpoints.
//!
//! Each capability is a trait whose operations are default methods over the core
//! [`StoreClient`]; a handle opts into a capability by implementing the trait:
//!
//! | Handle           | [`StoreRead`] | [`StoreEdit`] | [`StoreAdmin`] |
//! |------------------|:-------------:|:-------------:|:--------------:|
//! | [`LabbcatView`]  | yes           |               |                |
//! | [`LabbcatEdit`]  | yes           | yes           |                |
//! | [`LabbcatAdmin`] | yes           | yes           | yes            |
//!
//! Handles deref to the core for task polling, search and fragment downloads, which every
//! capability level shares. The core has no edit or admin methods, so a view handle cannot
//! reach an edit endpoint.

mod admin;
mod edit;
mod read;


pub use admin::StoreAdmin;
pub use edit::StoreEdit;
pub use read::StoreRead;

use std::ops::Deref;

use crate::client::StoreClient;
use crate::config::Config;
use crate::error::Result;

macro_rules! store_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name {
            client: StoreClient,
        }

        impl $name {
            /// Connect to the configured store
            ///
            /// # Errors
            ///
            /// Returns an error if the configuration is invalid.
            pub fn new(config: Config) -> Result<Self> {
                Ok(Self {
                    client: StoreClient::new(config)?,
                })
            }

            /// The underlying client
            pub fn client(&self) -> &StoreClient {
                &self.client
            }
        }

        impl From<StoreClient> for $name {
            fn from(client: StoreClient) -> Self {
                Self { client }
            }
        }

        impl Deref for $name {
            type Target = StoreClient;

            fn deref(&self) -> &StoreClient {
                &self.client
            }
        }

        impl StoreRead for $name {
            fn core(&self) -> &StoreClient {
                &self.client
            }
        }
    };
}

store_handle!(
    /// Read-only access to a store
    ///
    /// ```no_run
    /// use labbcat::{Config, LabbcatView, StoreRead};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = LabbcatView::new(Config::new("https://labbcat.example.org/labbcat"))?;
    /// let layers = store.get_layer_ids().await;
    /// println!("{:?}", layers.result);
    /// # Ok(())
    /// # }
    /// ```
    LabbcatView
);

store_handle!(
    /// Read and edit access to a store
    LabbcatEdit
);

store_handle!(
    /// Full access to a store, including corpus administration
    LabbcatAdmin
);

impl StoreEdit for LabbcatEdit {}

impl StoreEdit for LabbcatAdmin {}
impl StoreAdmin for LabbcatAdmin {}

//! Domain types exchanged between the db layer, services, and routes.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartAction, CartLine};
pub use order::{Order, OrderItem, OrderItemRequest, OrderStatusPatch, ShippingAddress};
pub use product::{NewProduct, Product, ProductFilter, ProductPatch};
pub use user::{Identity, User};

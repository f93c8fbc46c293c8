//! Wishlist, cart and checkout against a live storefront.

use rust_decimal::Decimal;

use shopzify_client::{NoticeKind, WishlistSync};
use shopzify_integration_tests::{TestServer, address, create_product};

#[tokio::test]
async fn test_wishlist_sync_round_trip() {
    let server = TestServer::spawn().await;
    let client = server.signed_in("wish@example.com").await;
    let shirt = create_product(&client, "Oxford Shirt", "male", "shirts").await;
    let dress = create_product(&client, "Linen Dress", "female", "dresses").await;

    let mut sync = WishlistSync::new();
    sync.refresh(&client).await.unwrap();
    assert!(sync.items().is_empty());

    let notice = sync.toggle(&client, &shirt).await;
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message, "Product added to wishlist");
    let notice = sync.toggle(&client, &dress).await;
    assert_eq!(notice.kind, NoticeKind::Success);
    assert!(sync.contains(shirt.id) && sync.contains(dress.id));

    // Remove from the wishlist view, which sends `productId`
    let entry = sync.items()[0].clone();
    let notice = sync.toggle_entry(&client, &entry).await;
    assert_eq!(notice.message, "Product removed from wishlist");

    let server_view = client.wishlist().await.unwrap();
    let ids: Vec<_> = server_view.products.iter().map(|e| e.product_id).collect();
    assert_eq!(ids, vec![dress.id]);
    assert_eq!(sync.items(), server_view.products.as_slice());
}

#[tokio::test]
async fn test_toggle_of_deleted_product_reverts() {
    let server = TestServer::spawn().await;
    let client = server.signed_in("gone@example.com").await;
    let scarf = create_product(&client, "Silk Scarf", "female", "accessories").await;
    client.delete_product(scarf.id).await.unwrap();

    let mut sync = WishlistSync::new();
    let notice = sync.toggle(&client, &scarf).await;

    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "Product not found");
    assert!(sync.items().is_empty());
}

#[tokio::test]
async fn test_checkout_snapshots_and_empties_cart() {
    let server = TestServer::spawn().await;
    let client = server.signed_in("buyer@example.com").await;
    let shirt = create_product(&client, "Oxford Shirt", "male", "shirts").await;

    let cart = client.add_to_cart(shirt.id, Some(2)).await.unwrap();
    assert_eq!(cart.summary.item_count, 2);
    assert_eq!(cart.summary.subtotal, Decimal::from(900));

    let placed = client.place_checkout(&address()).await.unwrap();
    assert_eq!(placed.message, "Order placed successfully");
    assert_eq!(placed.checkout.products.len(), 1);
    assert_eq!(placed.checkout.summary.subtotal, Decimal::from(900));

    let cart = client.cart().await.unwrap();
    assert!(cart.cart.products.is_empty());
    let orders = client.checkouts().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, placed.checkout.id);

    let err = client.place_checkout(&address()).await.unwrap_err();
    assert_eq!(err.user_message().0, "Your cart is empty");
}

#[tokio::test]
async fn test_search_synonyms_match_gender_only() {
    let server = TestServer::spawn().await;
    let client = server.client();
    let shirt = create_product(&client, "Oxford Shirt", "male", "shirts").await;
    create_product(&client, "Linen Dress", "female", "dresses").await;
    let bag = create_product(&client, "Garment Bag", "unisex", "menswear").await;

    // "menswear" contains "men" but is not a male product
    let men = client.search("men").await.unwrap();
    assert_eq!(men.len(), 1);
    assert_eq!(men[0].id, shirt.id);

    let menswear = client.search("menswear").await.unwrap();
    assert_eq!(menswear.len(), 1);
    assert_eq!(menswear[0].id, bag.id);

    let cotton = client.search("ORGANIC   cotton").await.unwrap();
    assert_eq!(cotton.len(), 3);

    let nav = client.nav_products("women", None).await.unwrap();
    assert_eq!(nav.products.len(), 1);
    assert_eq!(nav.products[0].category, "dresses");
}

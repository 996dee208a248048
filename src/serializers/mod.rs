pub mod product_serializer;
